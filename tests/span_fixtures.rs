//! Span policies and octave spans checked against recorded reference values.

use gausstable::lowlevel::{OpenCvSpan, SpanPolicy, VlFeatSpan};
use gausstable::{build_table, GaussConfig, SpanMode};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct RadiusCase {
    sigma: f32,
    vlfeat: usize,
    opencv: usize,
}

#[derive(Debug, Deserialize)]
struct OctaveCase {
    case_id: String,
    sigma0: f32,
    levels: usize,
    initial_blur: f32,
    span_mode: String,
    spans: Vec<usize>,
    #[serde(default)]
    #[cfg_attr(not(feature = "absolute-sigma"), allow(dead_code))]
    abs_spans: Option<Vec<usize>>,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    radii: Vec<RadiusCase>,
    octaves: Vec<OctaveCase>,
}

fn load_fixture() -> Fixture {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("span_radii.json");
    let text = fs::read_to_string(&path).expect("read span fixture");
    serde_json::from_str(&text).expect("parse span fixture")
}

#[test]
fn policies_match_reference_radii() {
    let fixture = load_fixture();
    for case in &fixture.radii {
        assert_eq!(
            VlFeatSpan::radius(case.sigma),
            case.vlfeat,
            "vlfeat radius for sigma {}",
            case.sigma
        );
        assert_eq!(
            OpenCvSpan::radius(case.sigma),
            case.opencv,
            "opencv radius for sigma {}",
            case.sigma
        );
        assert_eq!(SpanMode::VlFeat.radius(case.sigma).unwrap(), case.vlfeat);
        assert_eq!(SpanMode::OpenCv.radius(case.sigma).unwrap(), case.opencv);
    }
}

#[test]
fn policies_diverge_at_sigma_one_point_two() {
    let vl = SpanMode::VlFeat.radius(1.2).unwrap();
    let cv = SpanMode::OpenCv.radius(1.2).unwrap();
    assert_eq!(vl, 5);
    assert_eq!(cv, 4);
}

#[test]
fn octave_spans_match_reference() {
    let fixture = load_fixture();
    for case in &fixture.octaves {
        let mode: SpanMode = case.span_mode.parse().unwrap();
        let cfg = GaussConfig::default()
            .with_span_mode(mode)
            .with_initial_blur(case.initial_blur);
        let table = build_table(&cfg, case.sigma0, case.levels).unwrap();

        let spans: Vec<usize> = (0..case.spans.len())
            .map(|level| table.span(level).unwrap())
            .collect();
        assert_eq!(spans, case.spans, "{}", case.case_id);

        #[cfg(feature = "absolute-sigma")]
        {
            if let Some(abs_spans) = &case.abs_spans {
                let got: Vec<usize> = (0..abs_spans.len())
                    .map(|level| table.abs_span(level).unwrap())
                    .collect();
                assert_eq!(&got, abs_spans, "{}", case.case_id);
            }
        }
    }
}

#[test]
fn spans_follow_policy_applied_to_incremental_sigma() {
    for mode in [SpanMode::VlFeat, SpanMode::OpenCv] {
        let cfg = GaussConfig::default().with_span_mode(mode);
        let table = build_table(&cfg, 1.6, 3).unwrap();
        for level in 0..table.required_filter_stages() {
            let sigma = table.sigma(level).unwrap();
            assert_eq!(table.span(level).unwrap(), mode.radius(sigma).unwrap());
        }
    }
}
