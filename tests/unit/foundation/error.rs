use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TacticalError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TacticalError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        TacticalError::asset("x")
            .to_string()
            .contains("asset load error:")
    );
    assert!(
        TacticalError::upload("x")
            .to_string()
            .contains("upload error:")
    );
    assert!(
        TacticalError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn job_failure_names_the_job() {
    let err = TacticalError::job_failed("abc", "worker crashed");
    let msg = err.to_string();
    assert!(msg.contains("abc"));
    assert!(msg.contains("worker crashed"));
}

#[test]
fn only_upload_and_job_failures_are_user_visible() {
    assert!(TacticalError::upload("refused").is_user_visible());
    assert!(TacticalError::job_failed("abc", "x").is_user_visible());
    assert!(!TacticalError::asset("missing texture").is_user_visible());
    assert!(!TacticalError::render("x").is_user_visible());
    assert!(!TacticalError::transport("x").is_user_visible());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TacticalError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
