#![no_main]

use libfuzzer_sys::fuzz_target;
use tangle_core::{Analysis, EdgeMap, GraphError, ViewMode};

fuzz_target!(|data: &[u8]| {
    let Ok(edges) = serde_json::from_slice::<EdgeMap>(data) else {
        return;
    };

    for view in [ViewMode::CorePeriphery, ViewMode::Median] {
        match Analysis::run(&edges, view) {
            Ok(analysis) => {
                let placed: usize = analysis.partitions.iter().map(|p| p.file_count).sum();
                assert_eq!(placed, edges.len());
                assert!(analysis.closure.relaxation_passes <= analysis.closure.pass_limit());
                let _ = analysis.report(true);
            }
            Err(err @ GraphError::DanglingReference { .. }) => assert!(!err.is_internal()),
            Err(err) => panic!("internal fault on valid input: {err}"),
        }
    }
});
