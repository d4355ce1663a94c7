//! Descriptor (`.scfg`) extraction.
//!
//! The descriptor is the configurator's XML project file. Two subsets are
//! read from it:
//!
//! ```text
//! <configuration component="r_bsp">
//!   <gridItem id="BSP_CFG_STACK_MAIN_BYTES" selectedIndex="0x1000"/>
//! </configuration>
//! <component display="r_bsp" version="7.20" .../>
//! ```
//!
//! Everything else in the document is ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use thiserror::Error;

use crate::context::ServiceContext;

/// Failure to load a descriptor. Always fatal for a run.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The descriptor file could not be read.
    #[error("failed to read descriptor {}: {error}", path.display())]
    Read {
        /// Path of the descriptor.
        path: PathBuf,
        /// Underlying I/O failure.
        error: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The descriptor is not well-formed XML.
    #[error("failed to parse descriptor {}: {source}", path.display())]
    Parse {
        /// Path of the descriptor.
        path: PathBuf,
        /// XML parser error.
        #[source]
        source: roxmltree::Error,
    },
}

/// One grid item selected in the configurator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigItem {
    /// The `component` attribute of the enclosing `configuration` element.
    pub owner: Option<String>,
    /// The grid item's `id`, matched against macro names.
    pub id: String,
    /// The `selectedIndex` attribute.
    pub value: Option<String>,
}

impl ConfigItem {
    /// Owner name for diagnostics.
    #[must_use]
    pub fn owner_label(&self) -> &str {
        self.owner.as_deref().unwrap_or("(unnamed)")
    }

    /// Selected value, with an absent attribute read as empty.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}

/// Grid items keyed by `(owner, id)`, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigItems {
    items: Vec<ConfigItem>,
    index: HashMap<(Option<String>, String), usize>,
}

impl ConfigItems {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an item.
    ///
    /// A repeated `(owner, id)` key is last-write-wins: the new value replaces
    /// the old one, and the entry keeps the position of the first occurrence.
    pub fn insert(&mut self, item: ConfigItem) {
        let key = (item.owner.clone(), item.id.clone());
        if let Some(&pos) = self.index.get(&key) {
            tracing::debug!(
                owner = item.owner_label(),
                id = %item.id,
                "descriptor repeats grid item; keeping last value"
            );
            self.items[pos] = item;
        } else {
            self.index.insert(key, self.items.len());
            self.items.push(item);
        }
    }

    /// Looks up the value for an exact `(owner, id)` key.
    #[must_use]
    pub fn get(&self, owner: Option<&str>, id: &str) -> Option<&ConfigItem> {
        self.index
            .get(&(owner.map(str::to_string), id.to_string()))
            .map(|&pos| &self.items[pos])
    }

    /// All items whose id equals `id`, across every owner.
    pub fn with_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ConfigItem> + 'a {
        self.items.iter().filter(move |item| item.id == id)
    }

    /// Iterates all items in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, ConfigItem> {
        self.items.iter()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no items were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ConfigItem> for ConfigItems {
    fn from_iter<I: IntoIterator<Item = ConfigItem>>(iter: I) -> Self {
        let mut items = Self::new();
        for item in iter {
            items.insert(item);
        }
        items
    }
}

impl<'a> IntoIterator for &'a ConfigItems {
    type Item = &'a ConfigItem;
    type IntoIter = std::slice::Iter<'a, ConfigItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A `component` element as recorded in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedModule {
    /// The `display` attribute.
    pub display: Option<String>,
    /// The `version` attribute.
    pub version: Option<String>,
}

/// Reads the descriptor and extracts every grid item.
///
/// # Errors
///
/// Returns [`DescriptorError`] if the file is missing or not well-formed.
pub fn extract(ctx: &ServiceContext, path: &Path) -> Result<ConfigItems, DescriptorError> {
    let text = read(ctx, path)?;
    let items = parse_config_items(path, &text)?;
    tracing::debug!(path = %path.display(), items = items.len(), "extracted grid items");
    Ok(items)
}

/// Reads the descriptor and extracts every component entry in document order.
///
/// # Errors
///
/// Returns [`DescriptorError`] if the file is missing or not well-formed.
pub fn extract_modules(
    ctx: &ServiceContext,
    path: &Path,
) -> Result<Vec<ObservedModule>, DescriptorError> {
    let text = read(ctx, path)?;
    let modules = parse_modules(path, &text)?;
    tracing::debug!(path = %path.display(), modules = modules.len(), "extracted components");
    Ok(modules)
}

/// Extracts grid items from descriptor text.
///
/// # Errors
///
/// Returns [`DescriptorError::Parse`] if the text is not well-formed XML.
pub fn parse_config_items(path: &Path, text: &str) -> Result<ConfigItems, DescriptorError> {
    let doc = parse(path, text)?;
    let mut items = ConfigItems::new();
    for configuration in elements(doc.root_element(), "configuration") {
        let owner = configuration.attribute("component").map(str::to_string);
        for grid_item in elements(configuration, "gridItem") {
            let Some(id) = grid_item.attribute("id") else {
                continue;
            };
            items.insert(ConfigItem {
                owner: owner.clone(),
                id: id.to_string(),
                value: grid_item.attribute("selectedIndex").map(str::to_string),
            });
        }
    }
    Ok(items)
}

/// Extracts component entries from descriptor text.
///
/// # Errors
///
/// Returns [`DescriptorError::Parse`] if the text is not well-formed XML.
pub fn parse_modules(path: &Path, text: &str) -> Result<Vec<ObservedModule>, DescriptorError> {
    let doc = parse(path, text)?;
    Ok(elements(doc.root_element(), "component")
        .map(|component| ObservedModule {
            display: component.attribute("display").map(str::to_string),
            version: component.attribute("version").map(str::to_string),
        })
        .collect())
}

fn read(ctx: &ServiceContext, path: &Path) -> Result<String, DescriptorError> {
    ctx.fs
        .read_to_string(path)
        .map_err(|error| DescriptorError::Read { path: path.to_path_buf(), error })
}

fn parse<'a>(path: &Path, text: &'a str) -> Result<Document<'a>, DescriptorError> {
    Document::parse(text)
        .map_err(|source| DescriptorError::Parse { path: path.to_path_buf(), source })
}

/// Descendant elements of `node` (excluding `node` itself) with tag `name`.
fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants().skip(1).filter(move |n| n.has_tag_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    const SCFG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<smc>
  <general version="2.0.0.0">
    <configuration>
      <property id="device" value="R5F565NEHxFB"/>
    </configuration>
  </general>
  <tool id="SWComponent" version="1.0.0.0">
    <configuration inuse="true" name="r_bsp" component="r_bsp">
      <allocatable id="NODE1" name="NODE1">
        <gridItem id="BSP_CFG_STACK_MAIN_BYTES" selectedIndex="0x1000"/>
        <gridItem id="BSP_CFG_HEAP_BYTES" selectedIndex="0x2000"/>
      </allocatable>
      <component description="Board support" detailDescription="" display="r_bsp" id="r_bsp7.20" version="7.20"/>
    </configuration>
    <configuration inuse="true" name="r_cmt_rx" component="r_cmt_rx">
      <allocatable id="NODE1" name="NODE1">
        <gridItem id="CMT_CFG_CH" selectedIndex="(0)"/>
        <gridItem id="NO_VALUE"/>
      </allocatable>
      <component display="r_cmt_rx" version="5.40"/>
    </configuration>
  </tool>
</smc>
"#;

    #[test]
    fn extracts_grid_items_keyed_by_owner() {
        let items = parse_config_items(Path::new("p.scfg"), SCFG).unwrap();
        assert_eq!(items.len(), 4);
        let heap = items.get(Some("r_bsp"), "BSP_CFG_HEAP_BYTES").unwrap();
        assert_eq!(heap.raw_value(), "0x2000");
        let cmt = items.get(Some("r_cmt_rx"), "CMT_CFG_CH").unwrap();
        assert_eq!(cmt.raw_value(), "(0)");
        let empty = items.get(Some("r_cmt_rx"), "NO_VALUE").unwrap();
        assert_eq!(empty.value, None);
        assert_eq!(empty.raw_value(), "");
    }

    #[test]
    fn configuration_without_owner_still_contributes() {
        let xml = r#"<root><configuration><gridItem id="X" selectedIndex="1"/></configuration></root>"#;
        let items = parse_config_items(Path::new("p.scfg"), xml).unwrap();
        let item = items.get(None, "X").unwrap();
        assert_eq!(item.owner_label(), "(unnamed)");
    }

    #[test]
    fn repeated_key_keeps_last_value_at_first_position() {
        let xml = r#"<root>
            <configuration component="A">
              <gridItem id="X" selectedIndex="1"/>
              <gridItem id="Y" selectedIndex="2"/>
              <gridItem id="X" selectedIndex="3"/>
            </configuration>
        </root>"#;
        let items = parse_config_items(Path::new("p.scfg"), xml).unwrap();
        let ids: Vec<(&str, &str)> = items.iter().map(|i| (i.id.as_str(), i.raw_value())).collect();
        assert_eq!(ids, vec![("X", "3"), ("Y", "2")]);
    }

    #[test]
    fn same_id_under_different_owners_is_kept_separately() {
        let xml = r#"<root>
            <configuration component="A"><gridItem id="X" selectedIndex="1"/></configuration>
            <configuration component="B"><gridItem id="X" selectedIndex="2"/></configuration>
        </root>"#;
        let items = parse_config_items(Path::new("p.scfg"), xml).unwrap();
        assert_eq!(items.with_id("X").count(), 2);
    }

    #[test]
    fn extracts_components_in_document_order() {
        let modules = parse_modules(Path::new("p.scfg"), SCFG).unwrap();
        assert_eq!(
            modules,
            vec![
                ObservedModule {
                    display: Some("r_bsp".to_string()),
                    version: Some("7.20".to_string())
                },
                ObservedModule {
                    display: Some("r_cmt_rx".to_string()),
                    version: Some("5.40".to_string())
                },
            ]
        );
    }

    #[test]
    fn missing_descriptor_is_fatal() {
        let ctx = ServiceContext::in_memory(MemoryFileSystem::new());
        let err = extract(&ctx, Path::new("absent.scfg")).unwrap_err();
        assert!(matches!(err, DescriptorError::Read { .. }));
    }

    #[test]
    fn malformed_descriptor_is_fatal() {
        let ctx = ServiceContext::in_memory(
            MemoryFileSystem::new().with_file("broken.scfg", "<smc><configuration></smc>"),
        );
        let err = extract_modules(&ctx, Path::new("broken.scfg")).unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { .. }));
        assert!(err.to_string().contains("broken.scfg"));
    }
}
