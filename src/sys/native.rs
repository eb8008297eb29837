/// Installs `env_logger` at `level`. Filters in `RUST_LOG` take precedence.
#[cfg(feature = "native")]
pub fn init(level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse(&filters);
    }

    let _ = builder.try_init();
}

/// Without a logger implementation only the level filter is applied.
#[cfg(not(feature = "native"))]
pub fn init(level: log::LevelFilter) {
    log::set_max_level(level);
}
