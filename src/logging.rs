/// Verbosity level mapped to the crate's log filter.
pub fn filter_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "nopackage=warn",
        1 => "nopackage=info",
        2 => "nopackage=debug",
        _ => "nopackage=trace",
    }
}

/// Initialize the logger with the specified verbosity level
///
/// # Arguments
/// * `verbose` - Verbosity level (0=warn, 1=info, 2=debug, 3+=trace)
///
/// `RUST_LOG` takes precedence when set.
pub fn setup_logger(verbose: u8) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter_for(verbose)))
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(filter_for(0), "nopackage=warn");
        assert_eq!(filter_for(2), "nopackage=debug");
        assert_eq!(filter_for(9), "nopackage=trace");
    }
}
