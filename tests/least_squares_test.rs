use nalgebra as na;
use projection_calibration::CalibrationError;
use projection_calibration::optimization::{least_squares_solve, least_squares_solve_detailed};

fn price_system() -> (na::DMatrix<f64>, na::DVector<f64>) {
    let a = na::DMatrix::from_row_slice(3, 2, &[2.0, 3.0, 7.0, 5.0, 2.0, 4.0]);
    let b = na::dvector![3.49, 7.60, 4.20];
    (a, b)
}

#[test]
fn test_price_inference() {
    let (a, b) = price_system();
    let x = least_squares_solve(&a, &b).unwrap();
    assert_eq!(x.len(), 2);
    assert!((x[0] - 0.51).abs() < 0.01, "apple: {}", x[0]);
    assert!((x[1] - 0.80).abs() < 0.01, "banana: {}", x[1]);
}

#[test]
fn test_square_system_is_exact() {
    let a = na::DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 2.0, 3.0]);
    let b = na::dvector![9.0, 13.0];
    let x = least_squares_solve(&a, &b).unwrap();
    assert!((x[0] - 1.4).abs() < 1e-12);
    assert!((x[1] - 3.4).abs() < 1e-12);
}

#[test]
fn test_solve_is_idempotent() {
    let (a, b) = price_system();
    let x0 = least_squares_solve(&a, &b).unwrap();
    let x1 = least_squares_solve(&a, &b).unwrap();
    assert_eq!(x0, x1);
}

#[test]
fn test_rank_deficient_minimum_norm() {
    // Both rows constrain only x0 + x1, the smallest solution splits evenly.
    let a = na::DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
    let b = na::dvector![2.0, 2.0];
    let solution = least_squares_solve_detailed(&a, &b).unwrap();
    assert_eq!(solution.rank, 1);
    assert!((solution.x[0] - 1.0).abs() < 1e-12);
    assert!((solution.x[1] - 1.0).abs() < 1e-12);
    assert!(solution.residual < 1e-20);
}

#[test]
fn test_detailed_reports_residual() {
    let (a, b) = price_system();
    let solution = least_squares_solve_detailed(&a, &b).unwrap();
    assert_eq!(solution.rank, 2);
    assert_eq!(solution.singular_values.len(), 2);
    let expected = (&a * &solution.x - &b).norm_squared();
    assert!((solution.residual - expected).abs() < 1e-15);
    assert!(solution.residual > 0.0);
}

#[test]
fn test_zero_matrix_gives_zero_solution() {
    let a = na::DMatrix::zeros(4, 3);
    let b = na::dvector![1.0, 2.0, 3.0, 4.0];
    let x = least_squares_solve(&a, &b).unwrap();
    assert_eq!(x, vec![0.0, 0.0, 0.0]);
}

#[test]
fn test_dimension_mismatch() {
    let (a, _) = price_system();
    let b = na::dvector![1.0, 2.0];
    let result = least_squares_solve(&a, &b);
    assert!(matches!(
        result,
        Err(CalibrationError::DimensionMismatch { a_rows: 3, b_rows: 2 })
    ));
}

#[test]
fn test_nan_coefficient_rejected() {
    let (mut a, b) = price_system();
    a[(1, 0)] = f64::NAN;
    let result = least_squares_solve(&a, &b);
    assert!(matches!(
        result,
        Err(CalibrationError::NonFiniteEntry { row: 1, column: 0 })
    ));
}

#[test]
fn test_infinite_target_rejected() {
    let (a, mut b) = price_system();
    b[2] = f64::INFINITY;
    let result = least_squares_solve_detailed(&a, &b);
    // Column 2 is one past the last coefficient column, i.e. the target.
    assert!(matches!(
        result,
        Err(CalibrationError::NonFiniteEntry { row: 2, column: 2 })
    ));
}
