//! JSON output of the page model

use crate::views::DashboardPage;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, page: &DashboardPage) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, page)?;
    writeln!(writer)
}
