use rigwatch_core::{DisplayConfig, RigwatchResult, StatusEngine};

/// Which status line(s) to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    Basal,
    Battery,
    Raw,
    Staleness,
    All,
}

/// Resolve the requested line(s), one string per output line
pub async fn execute_status(
    engine: &StatusEngine,
    display: &DisplayConfig,
    line: StatusLine,
) -> RigwatchResult<Vec<String>> {
    let lines = match line {
        StatusLine::Basal => vec![engine.current_basal(display).await?],
        StatusLine::Battery => vec![engine.rig_battery_level(display).await?],
        StatusLine::Raw => vec![engine.raw_data(display).await?],
        StatusLine::Staleness => vec![engine.sensor_staleness(display).await?],
        StatusLine::All => {
            let report = engine.report(display).await?;
            vec![report.basal, report.battery, report.raw, report.staleness]
        }
    };

    Ok(lines)
}
