//! Gradle dependency scanning
//!
//! Only needs to answer "is artifact X on the classpath", so build scripts are
//! scanned for coordinate strings instead of being evaluated.

use crate::error::Result;
use regex::Regex;
use std::sync::OnceLock;

fn coordinate_regex() -> &'static Regex {
    static COORDINATE: OnceLock<Regex> = OnceLock::new();
    COORDINATE.get_or_init(|| {
        Regex::new(r#"["']([A-Za-z0-9_.\-]+):([A-Za-z0-9_.\-]+)(?::[^"'\s]*)?["']"#)
            .expect("coordinate regex is valid")
    })
}

/// `group:artifact` coordinates quoted in a `build.gradle(.kts)` script
pub fn scan_build_script(text: &str) -> Vec<String> {
    coordinate_regex()
        .captures_iter(text)
        .filter(|caps| caps[1].contains('.'))
        .map(|caps| format!("{}:{}", &caps[1], &caps[2]))
        .collect()
}

/// Library coordinates declared in a `libs.versions.toml` version catalog
pub fn scan_version_catalog(text: &str) -> Result<Vec<String>> {
    let catalog: toml::Table = toml::from_str(text)?;
    let Some(libraries) = catalog.get("libraries").and_then(|l| l.as_table()) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for entry in libraries.values() {
        match entry {
            toml::Value::String(notation) => out.push(notation.clone()),
            toml::Value::Table(table) => {
                if let Some(module) = table.get("module").and_then(|m| m.as_str()) {
                    out.push(module.to_string());
                } else if let (Some(group), Some(name)) = (
                    table.get("group").and_then(|g| g.as_str()),
                    table.get("name").and_then(|n| n.as_str()),
                ) {
                    out.push(format!("{group}:{name}"));
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_script_coordinates() {
        let script = r#"
dependencies {
    implementation("androidx.lifecycle:lifecycle-viewmodel-ktx:2.6.1")
    implementation 'org.jetbrains.kotlinx:kotlinx-coroutines-android:1.7.3'
    testImplementation("junit:junit:4.13.2")
    implementation(project(":core"))
    implementation(libs.androidx.core)
}
"#;
        let found = scan_build_script(script);
        assert_eq!(
            found,
            vec![
                "androidx.lifecycle:lifecycle-viewmodel-ktx".to_string(),
                "org.jetbrains.kotlinx:kotlinx-coroutines-android".to_string(),
            ]
        );
    }

    #[test]
    fn test_version_catalog() {
        let catalog = r#"
[versions]
lifecycle = "2.6.1"

[libraries]
lifecycle-viewmodel = { module = "androidx.lifecycle:lifecycle-viewmodel-ktx", version.ref = "lifecycle" }
coroutines = { group = "org.jetbrains.kotlinx", name = "kotlinx-coroutines-core", version = "1.7.3" }
junit = "junit:junit:4.13.2"
"#;
        let mut found = scan_version_catalog(catalog).unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![
                "androidx.lifecycle:lifecycle-viewmodel-ktx".to_string(),
                "junit:junit:4.13.2".to_string(),
                "org.jetbrains.kotlinx:kotlinx-coroutines-core".to_string(),
            ]
        );
    }

    #[test]
    fn test_catalog_without_libraries() {
        assert!(scan_version_catalog("[versions]\na = \"1\"\n").unwrap().is_empty());
        assert!(scan_version_catalog("not = [valid").is_err());
    }
}
