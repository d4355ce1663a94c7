//! Integration tests for top-level CLI behavior.

use std::path::Path;
use std::process::Command;

const SCFG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<smc>
  <tool id="SWComponent">
    <configuration inuse="true" name="r_bsp" component="r_bsp">
      <allocatable id="NODE1">
        <gridItem id="BSP_CFG_HEAP_BYTES" selectedIndex="0x2000"/>
        <gridItem id="BSP_CFG_PARAM_CHECKING_ENABLE" selectedIndex="1"/>
      </allocatable>
      <component display="r_bsp" version="7.20"/>
    </configuration>
    <configuration inuse="true" name="FreeRTOS_Kernel" component="FreeRTOS_Kernel">
      <allocatable id="NODE1">
        <gridItem id="configTICK_RATE_HZ" selectedIndex="1000"/>
      </allocatable>
      <component display="FreeRTOS_Kernel" version="1.0.120"/>
    </configuration>
  </tool>
</smc>
"#;

fn run_scfg_check(dir: &Path, args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_scfg-check");
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env_remove("SCFG_CHECK_PROFILE")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run scfg-check binary")
}

fn write(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "demo.scfg", SCFG);
    write(
        dir.path(),
        "src/smc_gen/r_config/r_bsp_config.h",
        "#ifndef R_BSP_CONFIG_H\n\
         #define R_BSP_CONFIG_H\n\
         #define BSP_CFG_HEAP_BYTES (0x2000) /* heap */\n\
         #define BSP_CFG_PARAM_CHECKING_ENABLE BSP_CFG_ON\n\
         #endif\n",
    );
    write(dir.path(), "src/frtos_config/FreeRTOSConfig.h", "#define configTICK_RATE_HZ 1000\n");
    write(dir.path(), "tools/macro_values.yaml", "- BSP_CFG_ON: 1\n- IRQ_CFG_PCLK_DIV64: 3\n");
    write(
        dir.path(),
        "tools/expected_modules.yaml",
        "- display: r_bsp\n  version: \"7.20\"\n- display: FreeRTOS_Kernel\n  version: \"1.0.120\"\n",
    );
    write(
        dir.path(),
        "scfg-check.yaml",
        "descriptor: demo.scfg\n\
         config_dir: src/smc_gen/r_config\n\
         single_header: src/frtos_config/FreeRTOSConfig.h\n\
         substitutions: tools/macro_values.yaml\n\
         expected_modules: tools/expected_modules.yaml\n",
    );
    dir
}

#[test]
fn values_clean_project_passes() {
    let dir = project();
    let output = run_scfg_check(dir.path(), &["values"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert_eq!(stdout, "No errors or warnings found.\n");
}

#[test]
fn values_reports_drift_without_failing() {
    let dir = project();
    write(dir.path(), "src/frtos_config/FreeRTOSConfig.h", "#define configTICK_RATE_HZ 100\n");
    let output = run_scfg_check(dir.path(), &["values"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains(
        "Warning: configTICK_RATE_HZ in FreeRTOS_Kernel does not match XML value (numerical comparison). \
         XML: 1000, FreeRTOSConfig.h: 100"
    ));
    assert!(stdout.ends_with("Total: 0 error(s), 1 warning(s).\n"));
}

#[test]
fn modules_match_exits_zero() {
    let dir = project();
    let output = run_scfg_check(dir.path(), &["modules"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Found FIT modules: display='r_bsp', version='7.20'"));
    assert!(stdout.ends_with("OK module version\n"));
}

#[test]
fn modules_drift_exits_nonzero() {
    let dir = project();
    write(
        dir.path(),
        "tools/expected_modules.yaml",
        "- display: r_bsp\n  version: \"7.19\"\n- display: r_fwup\n  version: \"2.00\"\n",
    );
    let output = run_scfg_check(dir.path(), &["modules"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("Not match r_fwup in XML of SmartConfigurator."));
    assert!(stdout.ends_with("NG module version\n"));
}

#[test]
fn all_runs_both_checks() {
    let dir = project();
    let output = run_scfg_check(dir.path(), &["all"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.starts_with("No errors or warnings found.\n"));
    assert!(stdout.ends_with("OK module version\n"));
}

#[test]
fn malformed_descriptor_is_fatal() {
    let dir = project();
    write(dir.path(), "demo.scfg", "<smc><configuration>");
    let output = run_scfg_check(dir.path(), &["values"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("failed to parse descriptor"));
}

#[test]
fn mistyped_header_paths_are_fatal() {
    let dir = project();
    let output = run_scfg_check(
        dir.path(),
        &["values", "--single-header", "typo/FreeRTOSConfig.h", "--config-dir", "typo_dir"],
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("typo_dir"));
}

#[test]
fn shift_jis_comment_does_not_hide_defines() {
    let dir = project();
    let mut header = b"/* \x83^\x83C\x83} \x90\xdd\x92\xe8 */\n".to_vec();
    header.extend_from_slice(b"#define configTICK_RATE_HZ 100\n");
    std::fs::write(dir.path().join("src/frtos_config/FreeRTOSConfig.h"), header).unwrap();
    let output = run_scfg_check(dir.path(), &["values"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Warning: configTICK_RATE_HZ in FreeRTOS_Kernel"));
    assert!(stdout.ends_with("Total: 0 error(s), 1 warning(s).\n"));
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_scfg_check(dir.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("values"));
    assert!(stdout.contains("modules"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_scfg_check(dir.path(), &["nonsense"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}
