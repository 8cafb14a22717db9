#![no_main]

use dijkstat::aggregate::Aggregator;
use dijkstat::dataset::Schema;
use dijkstat::loader::Loader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must load or fail cleanly, never panic
    for schema in [Schema::pathfinding(), Schema::iteration()] {
        if let Ok((dataset, _)) = Loader::new(schema).with_outlier_filter(5.0).load_reader(data) {
            let _ = Aggregator::new().summarize(&dataset);
        }
    }
});
