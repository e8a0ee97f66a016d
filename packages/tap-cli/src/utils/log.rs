use crate::cli::Tap;
use tracing::{level_filters::LevelFilter, subscriber::set_global_default};
use tracing_subscriber::FmtSubscriber;

/// Logger behavior based on the `verbose` flag:
///
/// * If `verbose` is set to `true`:
///   * The filter is set to `LevelFilter::INFO`, and the logger will print logs at the `Error`, `Warn`, and `Info` levels.
///
/// * If `verbose` is set to `false`:
///   * The filter is set to `LevelFilter::ERROR`, and the logger will only print logs at the `Error` level.
pub struct LoggerConfig {
    pub verbose: bool,
}

impl LoggerConfig {
    pub fn new(command: &Tap) -> Self {
        let verbose = match command {
            Tap::Generate(c) => c.verbose,
            Tap::OdataUrl(c) => c.verbose,
            Tap::Paginate(c) => c.verbose,
            Tap::Status(c) => c.verbose,
        };
        Self { verbose }
    }

    pub fn init(&self) -> anyhow::Result<()> {
        let level = if self.verbose {
            LevelFilter::INFO
        } else {
            LevelFilter::ERROR
        };

        let subscriber = FmtSubscriber::builder()
            .with_writer(std::io::stderr)
            .with_max_level(level)
            .finish();

        set_global_default(subscriber)?;

        Ok(())
    }
}
