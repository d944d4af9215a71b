use anyhow::{Result, anyhow};
use async_trait::async_trait;
use paintkeys::{Host, KeyChord, WalkConfig, parse_str, walk};
use std::collections::VecDeque;
use std::fs;
use std::process::Command;

const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project DefaultTargets="Build" ToolsVersion="17.0">
  <PropertyGroup Label="UserMacros" />
  <ItemDefinitionGroup Condition="'$(Configuration)|$(Platform)'=='Debug|x64'">
    <ClCompile>
      <AdditionalIncludeDirectories>$(SIV3D_0_6_10)\include;$(SIV3D_0_6_10)\include\ThirdParty;%(AdditionalIncludeDirectories)</AdditionalIncludeDirectories>
    </ClCompile>
    <Link>
      <AdditionalLibraryDirectories>$(SIV3D_0_6_10)\lib\Windows;%(AdditionalLibraryDirectories)</AdditionalLibraryDirectories>
    </Link>
  </ItemDefinitionGroup>
</Project>
"#;

/// Plays back layer names and records every chord pressed.
struct FakePaintApp {
    names: VecDeque<&'static str>,
    log: Vec<String>,
}

impl FakePaintApp {
    fn new(names: &[&'static str]) -> Self {
        Self {
            names: names.iter().copied().collect(),
            log: Vec::new(),
        }
    }

    fn count(&self, chord: &KeyChord) -> usize {
        let chord = chord.to_string();
        self.log.iter().filter(|entry| **entry == chord).count()
    }
}

#[async_trait(?Send)]
impl Host for FakePaintApp {
    async fn press(&mut self, chord: &KeyChord) -> Result<()> {
        self.log.push(chord.to_string());
        Ok(())
    }

    async fn read_clipboard(&mut self) -> Result<String> {
        let name = self
            .names
            .pop_front()
            .ok_or_else(|| anyhow!("no more layers"))?;
        self.log.push(format!("read {}", name));
        Ok(name.to_string())
    }
}

#[tokio::test]
async fn test_walk_merges_marked_layer_and_stops_at_paper() {
    let config = WalkConfig::immediate();
    let mut app = FakePaintApp::new(&["A#", "B", "用紙"]);

    let report = walk(&mut app, &config).await.unwrap();

    assert_eq!(report.layers, vec!["A#", "B", "用紙"]);
    assert_eq!(report.merged, vec!["A#"]);
    assert_eq!(app.count(&config.merge), 1);
    assert_eq!(app.count(&config.down), 2);

    // The merge directly follows the marked layer's read-and-cancel.
    let read_a = app.log.iter().position(|e| e == "read A#").unwrap();
    assert_eq!(app.log[read_a + 1], config.cancel.to_string());
    assert_eq!(app.log[read_a + 2], config.merge.to_string());

    // Nothing after the bottom layer but closing its rename field.
    assert_eq!(
        app.log.last().map(String::as_str),
        Some(config.cancel.to_string().as_str())
    );
    assert_eq!(app.log[app.log.len() - 2], "read 用紙");
}

#[tokio::test]
async fn test_walk_with_parsed_config() {
    let config = parse_str(
        r#"
# Krita-style bindings
rename F3
merge Ctrl+E
down PageDown
marker "[m]"       # merge marker
bottom "Background"
delay 0ms
focus 0s
"#,
    )
    .unwrap();
    let mut app = FakePaintApp::new(&["ink [m]", "colors", "shade [m]", "Background"]);

    let report = walk(&mut app, &config).await.unwrap();

    assert_eq!(report.merged, vec!["ink [m]", "shade [m]"]);
    assert_eq!(app.count(&"F3".parse::<KeyChord>().unwrap()), 4);
    assert_eq!(app.count(&"Ctrl+E".parse::<KeyChord>().unwrap()), 2);
    assert_eq!(app.count(&"PageDown".parse::<KeyChord>().unwrap()), 3);
}

#[tokio::test]
async fn test_walk_without_bottom_layer_fails() {
    let mut app = FakePaintApp::new(&["A", "B"]);
    let err = walk(&mut app, &WalkConfig::immediate()).await.unwrap_err();
    assert!(format!("{:#}", err).contains("no more layers"));
}

#[test]
fn test_switch_version_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("ExStaticLib.vcxproj");
    fs::write(&project, PROJECT).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_paintkeys"))
        .current_dir(dir.path())
        .arg("switch-version")
        .arg("0_6_13")
        .output()
        .expect("Failed to execute paintkeys");

    assert!(
        output.status.success(),
        "paintkeys failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let patched = fs::read_to_string(&project).unwrap();
    assert_eq!(patched, PROJECT.replace("SIV3D_0_6_10", "SIV3D_0_6_13"));
}

#[test]
fn test_switch_version_defaults_and_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("Other.vcxproj");
    fs::write(&project, PROJECT).unwrap();

    for _ in 0..2 {
        let status = Command::new(env!("CARGO_BIN_EXE_paintkeys"))
            .arg("switch-version")
            .arg("--file")
            .arg(&project)
            .status()
            .expect("Failed to execute paintkeys");
        assert!(status.success());
    }

    let patched = fs::read_to_string(&project).unwrap();
    assert_eq!(patched, PROJECT.replace("SIV3D_0_6_10", "SIV3D_0_6_12"));
}

#[test]
fn test_switch_version_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_paintkeys"))
        .current_dir(dir.path())
        .arg("switch-version")
        .output()
        .expect("Failed to execute paintkeys");

    assert!(
        !output.status.success(),
        "paintkeys should fail without a project file"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("ExStaticLib.vcxproj"),
        "Error should name the missing file, got: {stderr}"
    );
}

#[test]
fn test_switch_version_without_tokens_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("Plain.vcxproj");
    fs::write(&project, "<Project />\n").unwrap();

    let patched = paintkeys::patch_file(&project, "0_6_12").unwrap();

    assert_eq!(patched.replacements, 0);
    assert_eq!(fs::read_to_string(&project).unwrap(), "<Project />\n");
}

/// A layer record with a plain Pascal name and no additional info.
fn psd_record(name: &str, hidden: bool) -> Vec<u8> {
    let mut extra = vec![0u8; 8]; // empty mask and blending ranges
    extra.push(name.len() as u8);
    extra.extend(name.as_bytes());
    while extra.len() % 4 != 0 {
        extra.push(0);
    }

    let mut rec = vec![0u8; 16];
    rec.extend(0u16.to_be_bytes());
    rec.extend(b"8BIMnorm");
    rec.extend([255, 0, if hidden { 0b10 } else { 0 }, 0]);
    rec.extend((extra.len() as u32).to_be_bytes());
    rec.extend(extra);
    rec
}

/// A 64x32 PSD with `names` listed top to bottom.
fn psd_file(names: &[(&str, bool)]) -> Vec<u8> {
    let mut info = (names.len() as i16).to_be_bytes().to_vec();
    for (name, hidden) in names.iter().rev() {
        info.extend(psd_record(name, *hidden));
    }

    let mut out = b"8BPS".to_vec();
    out.extend(1u16.to_be_bytes());
    out.extend([0u8; 6]);
    out.extend(3u16.to_be_bytes());
    out.extend(32u32.to_be_bytes());
    out.extend(64u32.to_be_bytes());
    out.extend(8u16.to_be_bytes());
    out.extend(3u16.to_be_bytes());
    out.extend([0u8; 8]); // color mode data, image resources
    out.extend((info.len() as u32 + 4).to_be_bytes());
    out.extend((info.len() as u32).to_be_bytes());
    out.extend(info);
    out
}

#[test]
fn test_layers_lists_psd_top_to_bottom() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("art.psd");
    fs::write(&path, psd_file(&[("ink#", false), ("sketch", true), ("paper", false)])).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_paintkeys"))
        .arg("layers")
        .arg(&path)
        .output()
        .expect("Failed to execute paintkeys");

    assert!(
        output.status.success(),
        "paintkeys failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert!(lines[0].ends_with("(64x32, 3 layers)"), "got: {stdout}");
    assert_eq!(lines[1], "   0  ink#  [merge]");
    assert_eq!(lines[2], "   1  sketch  [hidden]");
    assert_eq!(lines[3], "   2  paper");
}

#[test]
fn test_layers_rejects_non_psd() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("art.png");
    fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_paintkeys"))
        .arg("layers")
        .arg(&path)
        .output()
        .expect("Failed to execute paintkeys");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not a PSD file"), "got: {stderr}");
}
