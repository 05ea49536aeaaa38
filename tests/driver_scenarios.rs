use dialog_interceptor::{
    Availability, DialogKind, Error, FrameOptions, Page, PageConfig, PlatformCapabilities,
    Result, ScriptCommand, StorageMode, Value, keys,
};

#[test]
fn driver_session_against_durable_page() -> Result<()> {
    let mut page = Page::new(PageConfig::default().with_origin("https://shop.test"))?;
    let top = page.top_window();

    let install = ScriptCommand::ReplaceAlertMethod {
        element_argument: None,
    };
    let answer = ScriptCommand::AnswerOnNextPrompt {
        answer: "Taro".into(),
    };
    page.execute_script(top, &format!("{} {}", install.to_script(), answer.to_script()), &[])?;

    // Page script reacting to clicks.
    let name = page.prompt(top, Some("Your name?"), Some("guest"))?;
    page.alert(top, &format!("Hello {}", name.unwrap_or_default()))?;
    let proceed = page.confirm(top, "Checkout?")?;

    assert!(proceed);
    assert_eq!(
        page.recorded_messages(top, DialogKind::Alert)?,
        vec!["Hello Taro"]
    );
    assert_eq!(
        page.storage_item(top, keys::PROMPTS)?.as_deref(),
        Some(r#"["Your name?"]"#)
    );
    assert_eq!(page.storage_mode(top)?, Some(StorageMode::Durable));
    assert!(page.native_dialogs().is_empty());
    Ok(())
}

#[test]
fn sandboxed_page_without_storage_records_on_globals() -> Result<()> {
    let mut page = Page::new(PageConfig::default().with_capabilities(
        PlatformCapabilities::full()
            .with_local_storage(Availability::Missing)
            .with_json(Availability::Missing),
    ))?;
    let top = page.top_window();

    page.replace_alert_method(top, None)?;
    page.alert(top, "hi")?;

    assert_eq!(
        page.global(top, keys::ALERTS)?,
        Some(Value::List(vec!["hi".to_string()]))
    );
    assert_eq!(page.storage_item(top, keys::ALERTS)?, None);
    assert_eq!(page.probe_storage_mode(top)?, StorageMode::Volatile);
    Ok(())
}

#[test]
fn install_into_frame_shares_state_with_top() -> Result<()> {
    let mut page = Page::new(PageConfig::default())?;
    let top = page.top_window();
    let frame = page.add_frame(top, FrameOptions::default())?;
    let button = page.create_element(frame.window, "button")?;

    page.execute_script(top, "replaceAlertMethod(arguments[0]);", &[button])?;
    page.alert(frame.window, "clicked inside frame")?;
    page.alert(top, "clicked outside")?;

    assert_eq!(
        page.recorded_messages(top, DialogKind::Alert)?,
        vec!["clicked inside frame", "clicked outside"]
    );
    assert_eq!(
        page.dialog_binding(frame.window, DialogKind::Prompt)?,
        page.dialog_binding(top, DialogKind::Prompt)?
    );
    Ok(())
}

#[test]
fn reinstall_after_navigation_keeps_queued_answer() -> Result<()> {
    let mut page = Page::new(PageConfig::default())?;
    let top = page.top_window();
    page.replace_alert_method(top, None)?;
    page.answer_on_next_prompt(top, "after navigation")?;

    page.reload(top)?;
    page.alert(top, "unpatched")?;
    page.replace_alert_method(top, None)?;

    assert_eq!(
        page.prompt(top, Some("q"), None)?,
        Some("after navigation".to_string())
    );
    assert_eq!(page.take_native_dialogs().len(), 1);
    Ok(())
}

#[test]
fn stale_window_handles_are_rejected() -> Result<()> {
    let mut page = Page::new(PageConfig::default())?;
    let top = page.top_window();
    let frame = page.add_frame(top, FrameOptions::default())?;
    page.navigate(top, "https://elsewhere.test")?;

    assert_eq!(
        page.replace_alert_method(frame.window, None),
        Err(Error::UnknownWindow(frame.window.index()))
    );
    assert_eq!(
        page.answer_on_next_prompt(frame.window, "x"),
        Err(Error::UnknownWindow(frame.window.index()))
    );
    Ok(())
}
