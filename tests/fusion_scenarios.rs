//! End-to-end fusion scenarios with hand-checked expected rankings.

use std::io::Cursor;

use trecfuse::{FusionMethod, FusionOptions, TrecRun};

fn run(raw: &str) -> TrecRun {
    TrecRun::parse(Cursor::new(raw), "scenario", false).expect("scenario run should parse")
}

fn lexical_and_vector() -> Vec<TrecRun> {
    vec![
        run("1 Q0 docX 1 9.0 tagA\n1 Q0 docY 2 5.0 tagA\n"),
        run("1 Q0 docY 1 7.0 tagB\n1 Q0 docZ 2 3.0 tagB\n"),
    ]
}

fn ranking(run: &TrecRun, topic: &str) -> Vec<(String, usize, f64)> {
    run.records_for_topic(topic, None)
        .into_iter()
        .map(|record| (record.docid.clone(), record.rank, record.score))
        .collect()
}

#[test]
fn rrf_rewards_documents_found_by_both_runs() {
    let fused = FusionMethod::ReciprocalRankFusion { k: 60 }
        .fuse(&lexical_and_vector(), &FusionOptions::default())
        .expect("rrf should succeed");

    let ranked = ranking(&fused, "1");
    let docids: Vec<&str> = ranked.iter().map(|(docid, _, _)| docid.as_str()).collect();
    assert_eq!(docids, vec!["docY", "docX", "docZ"]);
    assert_eq!(
        ranked.iter().map(|(_, rank, _)| *rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    assert!((ranked[0].2 - (1.0 / 62.0 + 1.0 / 61.0)).abs() < 1e-12);
    assert!((ranked[0].2 - 0.032523).abs() < 1e-6);
    assert!((ranked[1].2 - 0.016393).abs() < 1e-6);
    assert!((ranked[2].2 - 0.016129).abs() < 1e-6);
}

#[test]
fn interpolation_treats_missing_documents_as_zero() {
    let fused = FusionMethod::Interpolation { alpha: 0.5 }
        .fuse(&lexical_and_vector(), &FusionOptions::default())
        .expect("interpolation should succeed");

    let ranked = ranking(&fused, "1");
    assert_eq!(
        ranked,
        vec![
            ("docY".to_string(), 1, 6.0),
            ("docX".to_string(), 2, 4.5),
            ("docZ".to_string(), 3, 1.5),
        ]
    );
}

#[test]
fn average_keeps_topics_missing_from_some_runs() {
    let runs = vec![
        run("1 Q0 a 1 3.0 r1\n2 Q0 b 1 6.0 r1\n"),
        run("1 Q0 a 1 3.0 r2\n2 Q0 b 1 3.0 r2\n2 Q0 c 2 1.5 r2\n"),
        run("1 Q0 a 1 3.0 r3\n"),
    ];

    let fused = FusionMethod::Average
        .fuse(&runs, &FusionOptions::default())
        .expect("average should succeed");

    assert_eq!(ranking(&fused, "1"), vec![("a".to_string(), 1, 3.0)]);
    assert_eq!(
        ranking(&fused, "2"),
        vec![("b".to_string(), 1, 3.0), ("c".to_string(), 2, 0.5)]
    );
}

#[test]
fn depth_and_k_pass_through_to_the_merge() {
    let options = FusionOptions {
        depth: Some(1),
        k: Some(1),
        tag: "top1".to_string(),
        strict_topics: false,
    };
    let fused = FusionMethod::ReciprocalRankFusion { k: 60 }
        .fuse(&lexical_and_vector(), &options)
        .expect("rrf should succeed");

    // With depth 1 only docX (run A) and docY (run B) enter the pool and tie.
    let ranked = ranking(&fused, "1");
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].0, "docX");
    assert_eq!(fused.records()[0].tag, "top1");
}

#[test]
fn fusing_twice_writes_identical_bytes() {
    let runs = lexical_and_vector();
    let method = FusionMethod::ReciprocalRankFusion { k: 60 };

    let mut first = Vec::new();
    let mut second = Vec::new();
    method
        .fuse(&runs, &FusionOptions::default())
        .expect("rrf should succeed")
        .write_to(&mut first, None)
        .expect("write to buffer");
    method
        .fuse(&runs, &FusionOptions::default())
        .expect("rrf should succeed")
        .write_to(&mut second, None)
        .expect("write to buffer");

    assert_eq!(first, second);
    let text = String::from_utf8(first).expect("run output is utf-8");
    assert!(text.starts_with("1 Q0 docY 1 "));
    assert!(text.lines().all(|line| line.ends_with(" trecfuse.fusion")));
}
