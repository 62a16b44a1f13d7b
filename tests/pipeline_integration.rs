/// Integration tests for the design-storm pipeline
///
/// These tests verify, end to end through the public API:
/// 1. IDF curves increase with return period and decrease with duration
/// 2. Every storm method conserves its design depth at any peak position
/// 3. Excess rainfall never exceeds rainfall, interval by interval
/// 4. Hydrograph volume equals excess depth × area for every unit hydrograph
/// 5. The reference urban and rural catchments
///
/// Run with: cargo test --test pipeline_integration

use hidropluvial::HydroError;
use hidropluvial::hydrograph::UnitHydrographMethod;
use hidropluvial::idf::{
    IdfCoefficients, IdfCurve, IdfFormula, ShermanCoefficients, depth_from_intensity, intensity_from_depth,
};
use hidropluvial::model::{AntecedentMoisture, CatchmentParameters};
use hidropluvial::pipeline::{AnalysisRequest, run_analysis};
use hidropluvial::runoff::{RunoffModel, excess_series, scs_runoff, sub_areas, weighted_cn};
use hidropluvial::storm::{HuffProbability, HuffQuartile, StormMethod, StormRequest, generate};
use hidropluvial::tc::{TcMethod, calculate_tc};

fn urban() -> CatchmentParameters {
    CatchmentParameters::new("urban", 25.0, 2.5, 800.0, 45.0).with_coefficient(0.65)
}

fn rural() -> CatchmentParameters {
    let mut c = CatchmentParameters::new("rural", 500.0, 1.2, 3000.0, 80.0)
        .with_curve_number(75.0, AntecedentMoisture::Average);
    c.centroid_length_m = Some(1400.0);
    c
}

// ---------------------------------------------------------------------------
// IDF
// ---------------------------------------------------------------------------

#[test]
fn test_idf_orders_by_return_period_and_duration() {
    let curve = IdfCurve::regional(78.0, None);
    let periods = [2.0, 5.0, 10.0, 25.0, 50.0, 100.0];
    let at_1h: Vec<f64> = periods
        .iter()
        .map(|tr| curve.evaluate(*tr, 1.0).unwrap().intensity_mmhr)
        .collect();
    assert!(at_1h.windows(2).all(|w| w[0] < w[1]), "{at_1h:?}");

    assert!((curve.evaluate(10.0, 1.0).unwrap().ct - 1.0).abs() < 1e-12);
    let i1 = curve.evaluate(10.0, 1.0).unwrap().intensity_mmhr;
    let i3 = curve.evaluate(10.0, 3.0).unwrap().intensity_mmhr;
    let i6 = curve.evaluate(10.0, 6.0).unwrap().intensity_mmhr;
    assert!(i1 > i3 && i3 > i6);
}

#[test]
fn test_depth_intensity_round_trip() {
    for (i, d) in [(120.0, 15.0), (35.5, 60.0), (4.2, 1440.0)] {
        let depth = depth_from_intensity(i, d).unwrap();
        let back = intensity_from_depth(depth, d).unwrap();
        assert!((back - i).abs() / i < 1e-3);
    }
}

// ---------------------------------------------------------------------------
// Storm and runoff
// ---------------------------------------------------------------------------

#[test]
fn test_storms_conserve_depth_for_every_method() {
    let curve = IdfCurve::international(
        IdfFormula::Sherman,
        IdfCoefficients::Sherman(ShermanCoefficients { k: 1200.0, m: 0.18, c: 12.0, n: 0.78 }),
    )
    .unwrap();
    let expected = curve.depth(25.0, 2.0).unwrap();

    let mut storms = Vec::new();
    for k in 0..=10 {
        let p = k as f64 / 10.0;
        storms.push(StormMethod::AlternatingBlocks { peak_position: p });
        storms.push(StormMethod::Triangular { peak_position: p });
        storms.push(StormMethod::Chicago { advancement: p });
        if k > 0 && k < 10 {
            storms.push(StormMethod::Bimodal { first_peak: 0.25, second_peak: 0.75, volume_split: p, peak_width: 0.15 });
            storms.push(StormMethod::BimodalChicago { first_peak: 0.25, second_peak: 0.75, volume_split: p });
        }
    }
    for quartile in [HuffQuartile::Q1, HuffQuartile::Q2, HuffQuartile::Q3, HuffQuartile::Q4] {
        for probability in [HuffProbability::P10, HuffProbability::P50, HuffProbability::P90] {
            storms.push(StormMethod::Huff { quartile, probability });
        }
    }

    for storm in storms {
        let request = StormRequest { storm, return_period: 25.0, duration_hr: 2.0, dt_min: 5.0, total_depth_mm: None };
        let h = generate(&curve, &request).unwrap();
        assert!((h.total_depth() - expected).abs() < 1e-6 * expected, "{storm:?}");
        assert!(h.cumulative().windows(2).all(|w| w[1] >= w[0]), "{storm:?}");
        assert!(h.depths().iter().all(|d| *d >= 0.0), "{storm:?}");
    }
}

#[test]
fn test_excess_bounded_by_rain_for_both_models() {
    let curve = IdfCurve::regional(78.0, Some(5.0));
    let request = StormRequest {
        storm: "scs_type_ii".parse().unwrap(),
        return_period: 100.0,
        duration_hr: 24.0,
        dt_min: 15.0,
        total_depth_mm: None,
    };
    let h = generate(&curve, &request).unwrap();
    let depths = h.depths();
    for model in [
        RunoffModel::Rational { c: 0.8 },
        RunoffModel::CurveNumber { cn: 92.0, lambda: 0.05, amc: AntecedentMoisture::Wet },
    ] {
        let excess = excess_series(&model, &h).unwrap();
        for (e, d) in excess.excess_mm.iter().zip(&depths) {
            assert!(*e <= *d + 1e-12);
        }
    }
}

#[test]
fn test_standard_curve_number_runoff() {
    let q = scs_runoff(127.0, 75.0, 0.2).unwrap();
    assert!((q - 61.0).abs() / 61.0 < 0.10, "Q = {q}");
}

#[test]
fn test_composite_curve_number() {
    let parts = sub_areas(&[200.0, 150.0, 100.0, 50.0], &[72.0, 69.0, 55.0, 82.0]).unwrap();
    let cn = weighted_cn(&parts).unwrap();
    assert!((cn - 68.0).abs() < 1.0, "CN = {cn}");
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn test_urban_gz_scenario() {
    let c = urban();
    let desbordes = calculate_tc(TcMethod::Desbordes, &c).unwrap();
    let kirpich = calculate_tc(TcMethod::Kirpich, &c).unwrap();
    assert!(desbordes.tc_hr.is_finite() && desbordes.tc_hr > 0.0);
    assert!(kirpich.tc_hr.is_finite() && kirpich.tc_hr > 0.0);

    let result = run_analysis(&AnalysisRequest::new(c.clone(), TcMethod::Desbordes, StormMethod::Gz, 10.0)).unwrap();
    let idf_depth = IdfCurve::for_catchment(&c).depth(10.0, 6.0).unwrap();
    assert!((result.storm.total_depth_mm - idf_depth).abs() < 1e-6 * idf_depth);

    // peak falls in the first hour
    let peak = result
        .storm
        .intensities_mmhr
        .iter()
        .position(|i| *i == result.storm.peak_intensity_mmhr)
        .unwrap();
    assert!(result.storm.times_min[peak] <= 60.0);

    let q = &result.hydrograph;
    assert!(q.peak_flow_m3s.is_finite() && q.peak_flow_m3s > 0.0);
    assert!(q.time_to_peak_hr < result.storm.duration_hr);
}

#[test]
fn test_volume_matches_excess_for_every_unit_hydrograph() {
    let methods = [
        UnitHydrographMethod::Triangular { x: 1.67 },
        UnitHydrographMethod::Triangular { x: 1.25 },
        UnitHydrographMethod::Curvilinear,
        UnitHydrographMethod::Gamma { m: 3.7 },
        UnitHydrographMethod::Snyder { ct: 2.0, cp: 0.6 },
        UnitHydrographMethod::Clark { storage_hr: None },
    ];
    for method in methods {
        let mut request = AnalysisRequest::new(rural(), TcMethod::Kirpich, StormMethod::Gz, 25.0);
        request.unit_hydrograph = Some(method);
        let result = run_analysis(&request).unwrap();
        let q = &result.hydrograph;
        let expected = q.runoff_depth_mm * 500.0 / 100.0 * 1000.0;
        assert!((q.volume_m3 - expected).abs() / expected < 0.01, "{method}: {} vs {expected}", q.volume_m3);
        assert_eq!(q.times_hr.len(), q.flows_m3s.len());
    }
}

#[test]
fn test_bimodal_storm_on_large_catchment() {
    let c = CatchmentParameters::new("large", 5000.0, 0.5, 20000.0, 80.0)
        .with_curve_number(75.0, AntecedentMoisture::Average);
    let request = AnalysisRequest::new(c, TcMethod::Kirpich, "bimodal".parse().unwrap(), 10.0);
    let result = run_analysis(&request).unwrap();

    // Tc above 4 h pushes the step to 30 min
    assert!(result.tc.tc_hr > 4.0, "Tc = {}", result.tc.tc_hr);
    assert_eq!(result.storm.step_min, 30.0);
    assert!((result.storm.duration_hr - 6.0).abs() < 1e-9);
    assert!(result.hydrograph.peak_flow_m3s > 0.0);
}

#[test]
fn test_snyder_without_centroid_is_missing_parameter() {
    let mut c = rural();
    c.centroid_length_m = None;
    let mut request = AnalysisRequest::new(c, TcMethod::Kirpich, StormMethod::Gz, 10.0);
    request.unit_hydrograph = Some(UnitHydrographMethod::Snyder { ct: 2.0, cp: 0.6 });
    assert!(matches!(run_analysis(&request), Err(HydroError::MissingParameter { .. })));
}
