use super::*;

mod trace_and_config;

fn volatile_page() -> Result<Page> {
    Page::new(PageConfig::default().with_capabilities(
        PlatformCapabilities::full()
            .with_local_storage(Availability::Missing)
            .with_json(Availability::Missing),
    ))
}
