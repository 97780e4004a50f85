//! Newline-delimited JSON over a reader/writer pair.
//!
//! ```text
//! stdin : {"id":1,"type":"sim","argv":["sim","30"],"patternSource":"..."}
//! stdout: {"id":1,"ok":true,"data":{...}}
//! ```
//!
//! One reply line per request line, flushed immediately. A line that is not
//! a valid request but carries an `id` gets an unexpected-failure reply; a
//! line without an `id` cannot be answered and is logged and skipped.

use shared_types::{JobId, TaskHandler, TaskReply, TaskRequest};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

/// Serve requests until `input` reaches end of file. Returns the number of
/// replies written.
pub fn run_stdio_loop<R, W>(handler: &dyn TaskHandler, input: R, mut output: W) -> io::Result<u64>
where
    R: BufRead,
    W: Write,
{
    let mut served = 0u64;
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<TaskRequest>(line) {
            Ok(request) => {
                debug!(job_id = %request.id, kind = %request.payload.kind(), "Request received");
                handler.handle(request)
            }
            Err(e) => match salvage_id(line) {
                Some(id) => {
                    warn!(job_id = %id, error = %e, "Malformed request");
                    TaskReply::unexpected(id, format!("Malformed request: {e}"))
                }
                None => {
                    warn!(error = %e, "Dropping request line without an id");
                    continue;
                }
            },
        };

        serde_json::to_writer(&mut output, &reply)?;
        output.write_all(b"\n")?;
        output.flush()?;
        served += 1;
    }
    Ok(served)
}

fn salvage_id(line: &str) -> Option<JobId> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    value.get("id")?.as_u64().map(JobId::new)
}
