use sentryhook::error::TransportResult;
use sentryhook::protocol::Event;
use std::io::Write;

pub(crate) fn compact(writer: &mut dyn Write, event: &Event<'_>) -> TransportResult<()> {
    serde_json::to_writer(&mut *writer, event)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub(crate) fn pretty(writer: &mut dyn Write, event: &Event<'_>) -> TransportResult<()> {
    serde_json::to_writer_pretty(&mut *writer, event)?;
    writer.write_all(b"\n")?;
    Ok(())
}
