//! Resolver behavior across every rule revision.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use qtforge_recipe::{
    resolve, Arch, BuildType, OptionSet, RecipeError, RequirementKind, RuleRevision, Os, Settings,
};

fn settings_for(os: Os) -> Settings {
    match os {
        Os::Windows => Settings::new(os, Arch::X86_64, "Visual Studio", "16", BuildType::Release),
        Os::Macos => Settings::new(os, Arch::X86_64, "apple-clang", "13", BuildType::Release),
        Os::Linux => Settings::new(os, Arch::X86_64, "clang", "13", BuildType::Release),
    }
}

#[rstest]
#[case(RuleRevision::Qt56, Os::Windows, &["opengl", "openssl"])]
#[case(RuleRevision::Qt56, Os::Macos, &["framework"])]
#[case(RuleRevision::Qt56, Os::Linux, &[])]
#[case(RuleRevision::Qt515, Os::Windows, &["opengl", "openssl"])]
#[case(RuleRevision::Qt515, Os::Linux, &["opengl", "openssl"])]
#[case(RuleRevision::Qt515, Os::Macos, &["framework"])]
#[case(RuleRevision::Qt62, Os::Windows, &[])]
#[case(RuleRevision::Qt62, Os::Linux, &[])]
#[case(RuleRevision::Qt62, Os::Macos, &["framework", "universal"])]
fn effective_domain_matches_revision(
    #[case] revision: RuleRevision,
    #[case] os: Os,
    #[case] expected: &[&str],
) {
    let resolved = resolve(revision, &settings_for(os), &OptionSet::new()).unwrap();
    let names: Vec<&str> = resolved.options().iter().map(|(name, _)| name).collect();
    assert_eq!(names, expected);
}

#[rstest]
#[case(RuleRevision::Qt56, Os::Windows)]
#[case(RuleRevision::Qt515, Os::Windows)]
#[case(RuleRevision::Qt515, Os::Linux)]
fn openssl_modes_map_to_requirement_kinds(#[case] revision: RuleRevision, #[case] os: Os) {
    let settings = settings_for(os);

    let resolved = resolve(revision, &settings, &OptionSet::new().with("openssl", "yes")).unwrap();
    assert_eq!(resolved.requirements().len(), 1);
    assert_eq!(resolved.requirements()[0].kind, RequirementKind::BuildTime);

    let resolved =
        resolve(revision, &settings, &OptionSet::new().with("openssl", "linked")).unwrap();
    assert_eq!(resolved.requirements().len(), 1);
    assert_eq!(resolved.requirements()[0].kind, RequirementKind::LinkTime);

    let resolved = resolve(revision, &settings, &OptionSet::new().with("openssl", "no")).unwrap();
    assert!(resolved.requirements().is_empty());
}

#[rstest]
fn openssl_requirement_forces_shared_without_zlib() {
    let resolved = resolve(
        RuleRevision::Qt515,
        &settings_for(Os::Linux),
        &OptionSet::new().with("openssl", "linked"),
    )
    .unwrap();
    assert_eq!(
        resolved.requirements()[0].options,
        vec![
            ("shared".to_string(), "True".to_string()),
            ("no_zlib".to_string(), "True".to_string()),
        ]
    );
}

#[rstest]
#[case(RuleRevision::Qt56)]
#[case(RuleRevision::Qt515)]
#[case(RuleRevision::Qt62)]
fn macos_never_sees_gl_or_ssl_options(#[case] revision: RuleRevision) {
    let requested = OptionSet::new().with("framework", true);
    let resolved = resolve(revision, &settings_for(Os::Macos), &requested).unwrap();
    assert!(!resolved.contains("opengl"));
    assert!(!resolved.contains("openssl"));
    assert!(resolved.bool_value("framework").unwrap());
}

proptest! {
    // The architecture gate fires before domain filtering, compiler
    // checks, or anything else can mask it.
    #[test]
    fn x86_never_resolves(
        os in prop::sample::select(vec![Os::Windows, Os::Macos, Os::Linux]),
        revision in prop::sample::select(vec![
            RuleRevision::Qt56,
            RuleRevision::Qt515,
            RuleRevision::Qt62,
        ]),
        build_type in prop::sample::select(vec![BuildType::Debug, BuildType::Release]),
        compiler in "[a-zA-Z ]{0,16}",
    ) {
        let mut settings = settings_for(os);
        settings.arch = Arch::X86;
        settings.build_type = build_type;
        settings.compiler = compiler;
        let err = resolve(revision, &settings, &OptionSet::new()).unwrap_err();
        prop_assert!(matches!(err, RecipeError::UnsupportedArch(_)));
    }
}
