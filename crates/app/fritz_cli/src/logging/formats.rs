use std::io::Write;

use flexi_logger::{DeferredNow, style};
use log::{Level, Record};

/// `info` lines bare, everything else prefixed with its level.
pub fn cli_format(w: &mut dyn Write, _now: &mut DeferredNow, record: &Record) -> std::io::Result<()> {
    let level = record.level();
    if level == Level::Info {
        return write!(w, "{}", record.args());
    }
    write!(
        w,
        "{} {}",
        style(level).paint(level.as_str().to_lowercase()),
        record.args()
    )
}
