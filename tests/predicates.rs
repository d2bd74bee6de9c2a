use rivergraph::geometry::Point2;
use rivergraph::kernel::{circumcenter, circumradius, incircle, orient2d};

#[test]
fn ccw_test() {
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(1.0, 0.0);
    let c = Point2::new(0.0, 1.0);

    assert!(orient2d(&a, &b, &c) > 0.0); // counter-clockwise
    assert!(orient2d(&a, &c, &b) < 0.0);
}

#[test]
fn test_collinear() {
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(1.0, 1.0);
    let c = Point2::new(2.0, 2.0);
    assert_eq!(orient2d(&a, &b, &c), 0.0);
}

#[test]
fn test_near_collinear_is_consistent() {
    // c sits one ulp off the line through a and b
    let a = Point2::new(0.5, 0.5);
    let b = Point2::new(12.0, 12.0);
    let c = Point2::new(24.0, f64::from_bits(24.0f64.to_bits() + 1));
    let o = orient2d(&a, &b, &c);
    assert!(o > 0.0);
    assert!(orient2d(&b, &a, &c) < 0.0);
    assert!(orient2d(&b, &c, &a) > 0.0);
}

#[test]
fn test_incircle() {
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(1.0, 0.0);
    let c = Point2::new(0.0, 1.0);

    assert!(incircle(&a, &b, &c, &Point2::new(0.5, 0.5)) > 0.0);
    assert!(incircle(&a, &b, &c, &Point2::new(2.0, 2.0)) < 0.0);
    // the fourth corner of the unit square is cocircular
    assert_eq!(incircle(&a, &b, &c, &Point2::new(1.0, 1.0)), 0.0);
}

#[test]
fn test_circumcircle() {
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(2.0, 0.0);
    let c = Point2::new(0.0, 2.0);

    assert_eq!(circumcenter(&a, &b, &c), Point2::new(1.0, 1.0));
    assert!((circumradius(&a, &b, &c) - 2.0).abs() < 1e-12);

    let d = Point2::new(4.0, 0.0);
    assert!(!circumradius(&a, &b, &d).is_finite());
}
