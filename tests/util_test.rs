use projection_calibration::optimization::{EstimatorConfig, estimate};
use projection_calibration::synthetic::{SyntheticConfig, generate_correspondences};
use projection_calibration::util::{
    estimate_many, relative_projection_error, reprojection_errors, rms_reprojection_error,
};
use projection_calibration::{Correspondence, ProjectionMatrix};

#[test]
fn test_reprojection_errors_exact() {
    let synthetic = SyntheticConfig::default();
    let data = generate_correspondences(&synthetic);
    let errors = reprojection_errors(&synthetic.projection_matrix(), &data);
    assert_eq!(errors.len(), data.len());
    assert!(errors.iter().all(|e| e.unwrap() < 1e-9));
}

#[test]
fn test_rms_reprojection_error() {
    // Identity-like camera: u = x / z, v = y / z.
    let p = ProjectionMatrix::new([
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0,
    ]);
    let data = vec![
        Correspondence::new(3.0, 0.0, 0.0, 0.0, 1.0),
        Correspondence::new(0.0, 4.0, 0.0, 0.0, 1.0),
        // On the principal plane, skipped.
        Correspondence::new(0.0, 0.0, 1.0, 1.0, 0.0),
    ];
    let errors = reprojection_errors(&p, &data);
    assert_eq!(errors, vec![Some(3.0), Some(4.0), None]);
    let rms = rms_reprojection_error(&p, &data).unwrap();
    assert!((rms - 12.5f64.sqrt()).abs() < 1e-12);
    assert!(rms_reprojection_error(&p, &data[2..]).is_none());
}

#[test]
fn test_relative_error_ignores_scale_and_sign() {
    let p = SyntheticConfig::default().projection_matrix();
    let mut scaled = *p.coefficients();
    scaled.iter_mut().for_each(|c| *c *= -3.5);
    let err = relative_projection_error(&p, &ProjectionMatrix::new(scaled));
    assert!(err < 1e-12);

    let mut perturbed = *p.coefficients();
    perturbed[0] *= 2.0;
    assert!(relative_projection_error(&p, &ProjectionMatrix::new(perturbed)) > 1e-3);
}

#[test]
fn test_estimate_many_matches_sequential() {
    let sets: Vec<Vec<Correspondence>> = (0..8)
        .map(|seed| {
            generate_correspondences(&SyntheticConfig {
                seed,
                pixel_noise: 0.3,
                ..Default::default()
            })
        })
        .chain(std::iter::once(Vec::new()))
        .collect();
    let config = EstimatorConfig::default();
    let results = estimate_many(&sets, &config);
    assert_eq!(results.len(), sets.len());
    for (set, result) in sets.iter().zip(&results) {
        match (estimate(set, &config), result) {
            (Ok(expected), Ok(got)) => assert_eq!(&expected, got),
            (Err(_), Err(_)) => {}
            _ => panic!("parallel and sequential results disagree"),
        }
    }
    assert!(results.last().unwrap().is_err());
}
