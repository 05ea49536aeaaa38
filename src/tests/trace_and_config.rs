use super::*;

fn traced_page(config: PageConfig) -> Result<Page> {
    let mut page = Page::new(config.with_trace(true))?;
    page.set_trace_stderr(false);
    Ok(page)
}

#[test]
fn install_and_dialog_calls_are_traced() -> Result<()> {
    let mut page = traced_page(PageConfig::default())?;
    let top = page.top_window();
    page.replace_alert_method(top, None)?;
    page.replace_alert_method(top, None)?;
    page.alert(top, "hello")?;

    let logs = page.take_trace_logs();
    assert!(
        logs.iter().any(|line| line == "[install] window#0 mode=durable"),
        "{logs:?}"
    );
    assert!(
        logs.iter().any(|line| line == "[install] window#0 already installed"),
        "{logs:?}"
    );
    assert!(
        logs.iter()
            .any(|line| line.starts_with("[dialog] alert window#0 via window#0")),
        "{logs:?}"
    );
    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn volatile_decision_names_failed_capability() -> Result<()> {
    let mut page = traced_page(PageConfig::default().with_capabilities(
        PlatformCapabilities::full().with_local_storage(Availability::Throws),
    ))?;
    let top = page.top_window();
    page.replace_alert_method(top, None)?;

    let logs = page.take_trace_logs();
    assert!(
        logs.iter()
            .any(|line| line == "[probe] window#0 volatile: localStorage throws"),
        "{logs:?}"
    );
    Ok(())
}

#[test]
fn dialog_lines_can_be_silenced() -> Result<()> {
    let mut page = traced_page(PageConfig::default())?;
    let top = page.top_window();
    page.set_trace_dialogs(false);
    page.replace_alert_method(top, None)?;
    page.alert(top, "quiet")?;

    let logs = page.take_trace_logs();
    assert!(!logs.iter().any(|line| line.starts_with("[dialog]")), "{logs:?}");
    assert!(!logs.is_empty());
    Ok(())
}

#[test]
fn trace_log_limit_keeps_latest_entries() -> Result<()> {
    let mut page = traced_page(PageConfig::default())?;
    let top = page.top_window();
    page.replace_alert_method(top, None)?;
    for index in 0..5 {
        page.alert(top, &format!("m{index}"))?;
    }
    page.set_trace_log_limit(2)?;

    let logs = page.take_trace_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[1].contains("\"m4\""), "{logs:?}");
    Ok(())
}

#[test]
fn disabled_trace_records_nothing() -> Result<()> {
    let mut page = Page::new(PageConfig::default())?;
    let top = page.top_window();
    page.replace_alert_method(top, None)?;
    page.alert(top, "x")?;
    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn invalid_configuration_is_rejected() {
    assert!(matches!(
        Page::new(PageConfig::default().with_origin("  ")),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        Page::new(PageConfig {
            trace_log_limit: 0,
            ..PageConfig::default()
        }),
        Err(Error::InvalidConfig(_))
    ));

    let mut page = Page::new(PageConfig::default()).expect("page");
    assert!(matches!(
        page.set_trace_log_limit(0),
        Err(Error::InvalidConfig(_))
    ));
    let top = page.top_window();
    assert!(matches!(
        page.navigate(top, ""),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn local_storage_seed_keeps_last_duplicate() -> Result<()> {
    let page = Page::new(PageConfig::default().with_local_storage(&[
        ("k", "\"first\""),
        ("k", "\"second\""),
    ]))?;
    let top = page.top_window();
    assert_eq!(page.storage_item(top, "k")?.as_deref(), Some("\"second\""));
    Ok(())
}

#[test]
fn errors_display_their_context() {
    assert_eq!(
        Error::UnknownWindow(3).to_string(),
        "unknown window: 3"
    );
    assert_eq!(
        Error::ScriptParse("bad".into()).to_string(),
        "script parse error: bad"
    );
}
