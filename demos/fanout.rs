use std::sync::Arc;

use asynclog::{ConsoleSink, EscalationManager, FileSink, Level, LogPipeline, LogRecord};

fn main() -> std::io::Result<()> {
    let escalation = EscalationManager::open_default()?;
    let pipeline = Arc::new(LogPipeline::new(escalation));

    pipeline.add_sink(Box::new(ConsoleSink)).unwrap();
    pipeline.add_sink(Box::new(FileSink::new("demo.log")?)).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            std::thread::spawn(move || {
                for n in 0..10 {
                    pipeline.save(LogRecord::new(
                        Level::Info,
                        "demo",
                        format!("producer {i} message {n}"),
                    ));
                }
                pipeline.save(LogRecord::new(
                    Level::Warning,
                    "demo",
                    format!("producer {i} done"),
                ));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    pipeline.save(
        LogRecord::new(Level::Error, "demo", "simulated failure")
            .with_location("demos/fanout.rs", 36),
    );

    pipeline.shutdown().unwrap();
    Ok(())
}
