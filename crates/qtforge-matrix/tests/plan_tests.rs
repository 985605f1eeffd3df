//! Plan expansion against fixed environments.

use pretty_assertions::assert_eq;

use qtforge_matrix::{BuildPlan, Channel, CiEnv, MatrixError, PlanConfig};
use qtforge_recipe::{Manifest, Os, RecipeError};

fn manifest(revision: &str) -> Manifest {
    let version = match revision {
        "qt56" => "5.6.3",
        "qt515" => "5.15.2",
        _ => "6.2.4",
    };
    Manifest::from_str(&format!(
        r#"
        [package]
        name = "qt"
        version = "{version}"
        user = "amusic"

        [recipe]
        revision = "{revision}"
        "#
    ))
    .unwrap()
}

fn config() -> PlanConfig {
    PlanConfig {
        jobs: Some(4),
        ..PlanConfig::default()
    }
}

#[test]
fn windows_matrix_pairs_runtimes_and_drops_static_ones() {
    let env = CiEnv::from_map([
        ("QTFORGE_BRANCH", "master"),
        ("CONAN_VISUAL_VERSIONS", "15,16"),
    ]);
    let plan = BuildPlan::expand(Os::Windows, &manifest("qt515"), &env, &config()).unwrap();

    assert_eq!(plan.len(), 4);
    let cells: Vec<(String, String, String)> = plan
        .variants
        .iter()
        .map(|variant| {
            (
                variant.settings.compiler_version.clone(),
                variant.settings.build_type.to_string(),
                variant.settings.runtime.clone().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        cells,
        vec![
            ("15".to_string(), "Release".to_string(), "MD".to_string()),
            ("15".to_string(), "Debug".to_string(), "MDd".to_string()),
            ("16".to_string(), "Release".to_string(), "MD".to_string()),
            ("16".to_string(), "Debug".to_string(), "MDd".to_string()),
        ]
    );
    // debug variants stage sources, release ones do not
    assert!(!plan.variants[0].stage_sources);
    assert!(plan.variants[1].stage_sources);
}

#[test]
fn macos_versions_multiply_the_matrix() {
    let env = CiEnv::from_map([
        ("QTFORGE_BRANCH", "master"),
        ("CONAN_APPLE_CLANG_VERSIONS", "12,13"),
        ("CONAN_BUILD_TYPES", "Release"),
        ("QT_MACOS_VERSIONS", "10.14,10.15,11.0"),
    ]);
    let plan = BuildPlan::expand(Os::Macos, &manifest("qt515"), &env, &config()).unwrap();

    assert_eq!(plan.len(), 6);
    let versions: Vec<&str> = plan
        .variants
        .iter()
        .map(|variant| variant.settings.os_version.as_deref().unwrap())
        .collect();
    assert_eq!(versions, vec!["10.14", "10.15", "11.0", "10.14", "10.15", "11.0"]);

    // labels stay unique, they name the per-variant directories
    let mut labels: Vec<&str> = plan
        .variants
        .iter()
        .map(|variant| variant.label.as_str())
        .collect();
    labels.sort_unstable();
    labels.dedup();
    assert_eq!(labels.len(), 6);
}

#[test]
fn linux_has_no_matrix_driver() {
    let env = CiEnv::from_map([("QTFORGE_BRANCH", "master")]);
    let err = BuildPlan::expand(Os::Linux, &manifest("qt515"), &env, &config()).unwrap_err();
    assert!(matches!(err, MatrixError::UnsupportedPlatform(os) if os == "Linux"));
}

#[test]
fn version_lists_are_required() {
    let env = CiEnv::from_map([("QTFORGE_BRANCH", "master")]);
    let err = BuildPlan::expand(Os::Windows, &manifest("qt515"), &env, &config()).unwrap_err();
    assert!(matches!(
        err,
        MatrixError::MissingEnv(name) if name == "CONAN_VISUAL_VERSIONS"
    ));
}

#[test]
fn x86_arch_fails_the_whole_plan() {
    let env = CiEnv::from_map([
        ("QTFORGE_BRANCH", "master"),
        ("CONAN_VISUAL_VERSIONS", "16"),
        ("CONAN_ARCHS", "x86,x86_64"),
    ]);
    let err = BuildPlan::expand(Os::Windows, &manifest("qt515"), &env, &config()).unwrap_err();
    assert!(matches!(
        err,
        MatrixError::Recipe(RecipeError::UnsupportedArch(arch)) if arch == "x86"
    ));
}

#[test]
fn reference_uses_channel_and_user_override() {
    let env = CiEnv::from_map([
        ("QTFORGE_BRANCH", "release/6.2"),
        ("CONAN_STABLE_BRANCH_PATTERN", "release/*"),
        ("CONAN_USERNAME", "ci-bot"),
        ("CONAN_APPLE_CLANG_VERSIONS", "13"),
        ("CONAN_BUILD_TYPES", "Release"),
    ]);
    let plan = BuildPlan::expand(Os::Macos, &manifest("qt62"), &env, &config()).unwrap();
    assert_eq!(plan.channel, Channel::Stable);
    assert_eq!(plan.reference, "qt/6.2.4@ci-bot/stable");

    let env = CiEnv::from_map([
        ("QTFORGE_BRANCH", "feature/tweak"),
        ("CONAN_APPLE_CLANG_VERSIONS", "13"),
        ("CONAN_BUILD_TYPES", "Release"),
    ]);
    let plan = BuildPlan::expand(Os::Macos, &manifest("qt62"), &env, &config()).unwrap();
    assert_eq!(plan.channel, Channel::Testing);
    assert_eq!(plan.reference, "qt/6.2.4@amusic/testing");
}

#[test]
fn qt62_windows_wires_openssl_from_the_environment() {
    let env = CiEnv::from_map([
        ("QTFORGE_BRANCH", "master"),
        ("CONAN_VISUAL_VERSIONS", "16"),
        ("CONAN_BUILD_TYPES", "Release"),
        ("QT_OPENSSL_ROOT", "/opt/openssl"),
    ]);
    let plan = BuildPlan::expand(Os::Windows, &manifest("qt62"), &env, &config()).unwrap();

    assert_eq!(plan.len(), 1);
    let variant = &plan.variants[0];
    let configure = &variant.steps[0];
    assert!(configure.program.ends_with("configure.bat"));
    assert!(configure.args.iter().any(|arg| arg == "-openssl-runtime"));
    assert!(configure
        .args
        .iter()
        .any(|arg| arg == "-DOPENSSL_ROOT_DIR=/opt/openssl"));
    let references: Vec<&str> = variant
        .requirements
        .iter()
        .map(|requirement| requirement.reference.as_str())
        .collect();
    assert_eq!(references, vec!["ninja/1.10.2", "openssl/1.1.1g"]);
}

#[test]
fn missing_openssl_root_fails_before_any_command() {
    let env = CiEnv::from_map([
        ("QTFORGE_BRANCH", "master"),
        ("CONAN_VISUAL_VERSIONS", "16"),
        ("CONAN_BUILD_TYPES", "Release"),
    ]);
    let err = BuildPlan::expand(Os::Windows, &manifest("qt62"), &env, &config()).unwrap_err();
    assert!(matches!(
        err,
        MatrixError::Recipe(RecipeError::OpensslRootRequired)
    ));
}

#[test]
fn steps_run_in_per_variant_directories() {
    let env = CiEnv::from_map([
        ("QTFORGE_BRANCH", "master"),
        ("CONAN_VISUAL_VERSIONS", "16"),
    ]);
    let plan = BuildPlan::expand(Os::Windows, &manifest("qt515"), &env, &config()).unwrap();
    let dirs: Vec<&std::path::Path> = plan
        .variants
        .iter()
        .map(|variant| variant.steps[0].cwd.as_deref().unwrap())
        .collect();
    assert_eq!(dirs.len(), 2);
    assert_ne!(dirs[0], dirs[1]);
    assert!(dirs[0].starts_with("build"));
}

#[test]
fn plan_serializes_with_conan_spellings() {
    let env = CiEnv::from_map([
        ("QTFORGE_BRANCH", "master"),
        ("CONAN_APPLE_CLANG_VERSIONS", "13"),
        ("CONAN_BUILD_TYPES", "Release"),
    ]);
    let plan = BuildPlan::expand(Os::Macos, &manifest("qt62"), &env, &config()).unwrap();
    let value = serde_json::to_value(&plan).unwrap();

    assert_eq!(value["channel"], "stable");
    assert_eq!(value["revision"], "qt62");
    assert_eq!(value["host"], "Macos");
    assert_eq!(value["variants"][0]["settings"]["os"], "Macos");
    assert_eq!(value["variants"][0]["settings"]["arch"], "x86_64");
    assert_eq!(value["variants"][0]["settings"]["build_type"], "Release");
    assert_eq!(value["variants"][0]["options"]["framework"], false);
    assert!(value["variants"][0]["steps"].is_array());
}
