/// How the tracing subscriber formats output.
///
/// Built from `Settings` at startup; there is no ambient-environment
/// fallback beyond the `RUST_LOG` filter itself.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
}
