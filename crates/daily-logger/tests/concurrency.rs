//! Many producers, one writer

use daily_logger::{Logger, LoggerConfig};
use std::collections::HashMap;
use std::fs;
use std::thread;

const PRODUCERS: usize = 100;
const LINES_PER_PRODUCER: usize = 100;

#[test]
fn test_concurrent_producers_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Logger::boot(
        LoggerConfig::builder()
            .file_dir(dir.path())
            .file_name("busy.log")
            .build(),
    )
    .unwrap();

    thread::scope(|scope| {
        for producer in 0..PRODUCERS {
            let logger = &logger;
            scope.spawn(move || {
                for seq in 0..LINES_PER_PRODUCER {
                    logger.info(format_args!("producer={producer} seq={seq}"));
                }
            });
        }
    });
    logger.close();

    let contents = fs::read_to_string(dir.path().join("busy.log")).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), PRODUCERS * LINES_PER_PRODUCER);

    let mut next_seq: HashMap<usize, usize> = HashMap::new();
    for line in lines {
        let message = line.rsplit("] ").next().unwrap();
        let mut fields = message.split(' ');
        let producer: usize = fields.next().unwrap()["producer=".len()..].parse().unwrap();
        let seq: usize = fields.next().unwrap()["seq=".len()..].parse().unwrap();

        let expected = next_seq.entry(producer).or_insert(0);
        assert_eq!(seq, *expected, "producer {producer} out of order");
        *expected += 1;
    }

    assert_eq!(next_seq.len(), PRODUCERS);
    assert!(next_seq.values().all(|&n| n == LINES_PER_PRODUCER));
}

#[test]
fn test_small_queue_applies_backpressure_without_loss() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Logger::boot(
        LoggerConfig::builder()
            .file_dir(dir.path())
            .file_name("tight.log")
            .queue_capacity(1)
            .build(),
    )
    .unwrap();

    thread::scope(|scope| {
        for producer in 0..8 {
            let logger = &logger;
            scope.spawn(move || {
                for seq in 0..250 {
                    logger.warn(format_args!("p{producer} {seq}"));
                }
            });
        }
    });
    logger.close();

    let contents = fs::read_to_string(dir.path().join("tight.log")).unwrap();
    assert_eq!(contents.lines().count(), 8 * 250);
}
