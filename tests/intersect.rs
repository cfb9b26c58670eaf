use tensorgate::{
    validate_connection, Dimension, IntersectError, Layout, Precision, Shape, TensorInfo,
};

fn info(precision: Precision, shape: &str, layout: &str) -> TensorInfo {
    TensorInfo::new(
        "tensor",
        precision,
        shape.parse().unwrap(),
        layout.parse().unwrap(),
    )
}

/// A mix of compatible and incompatible specifications.
fn sample_infos() -> Vec<TensorInfo> {
    let mut infos = Vec::new();
    for precision in [Precision::Fp32, Precision::I32, Precision::Undefined] {
        for shape in [
            "(1,3,224,220:230)",
            "(1,-1,220:225,200:300)",
            "(-1,3,224,224)",
            "(1,3)",
            "(2,3,224,200:210)",
        ] {
            for layout in ["...", "N...", "NCHW", "NHWC"] {
                infos.push(info(precision, shape, layout));
            }
        }
    }
    infos.push(info(Precision::Fp32, "(1,3,224,224)", "NCHW").with_mapped_name("image"));
    infos.push(TensorInfo::new(
        "other",
        Precision::Fp32,
        Shape::from_static(&[1, 3, 224, 224]),
        Layout::Default,
    ));
    infos.push(TensorInfo::unspecified());
    infos
}

#[test]
fn test_range_scenario() {
    let produced = info(Precision::Fp32, "(1,3,224,220:230)", "NCHW");
    let expected = info(Precision::Fp32, "(1,-1,220:225,200:300)", "NCHW");

    let joined = produced.intersect(&expected).unwrap();
    assert_eq!(
        joined.shape(),
        &Shape::from([
            Dimension::Exact(1),
            Dimension::Exact(3),
            Dimension::Exact(224),
            Dimension::range(220, 230).unwrap(),
        ])
    );
    assert_eq!(joined.precision(), Precision::Fp32);
    assert_eq!(joined.layout(), &Layout::axes("NCHW").unwrap());
}

#[test]
fn test_precision_mismatch_scenario() {
    let a = info(Precision::Fp32, "(1,3,224,224)", "NCHW");
    let b = info(Precision::I32, "(1,3,224,224)", "NCHW");
    assert_eq!(
        a.intersect(&b),
        Err(IntersectError::PrecisionMismatch {
            left: Precision::Fp32,
            right: Precision::I32,
        })
    );
}

#[test]
fn test_intersect_is_commutative() {
    let infos = sample_infos();
    for a in &infos {
        for b in &infos {
            let ab = a.intersect(b);
            let ba = b.intersect(a);
            assert_eq!(ab.is_ok(), ba.is_ok(), "{} / {}", a, b);
            if let (Ok(ab), Ok(ba)) = (ab, ba) {
                assert_eq!(ab, ba, "{} / {}", a, b);
            }
        }
    }
}

#[test]
fn test_intersect_is_idempotent() {
    for a in sample_infos() {
        // Layout and shape ranks are only checked when intersecting.
        if a.layout().rank().is_some_and(|rank| rank != a.shape().rank()) {
            assert!(matches!(
                a.intersect(&a),
                Err(IntersectError::LayoutRankMismatch { .. })
            ));
            continue;
        }
        assert_eq!(a.intersect(&a), Ok(a.clone()), "{}", a);
    }
}

#[test]
fn test_unspecified_is_identity() {
    let unspecified = TensorInfo::unspecified();
    for x in sample_infos() {
        assert_eq!(unspecified.intersect(&x), Ok(x.clone()));
        assert_eq!(x.intersect(&unspecified), Ok(x.clone()));
    }
}

#[test]
fn test_intersection_is_narrower() {
    let infos = sample_infos();
    for a in &infos {
        for b in &infos {
            let Ok(joined) = a.intersect(b) else {
                continue;
            };

            // Intersecting again with either operand does not change the result.
            assert_eq!(joined.intersect(a).as_ref(), Ok(&joined), "{} / {}", a, b);
            assert_eq!(joined.intersect(b).as_ref(), Ok(&joined), "{} / {}", a, b);
        }
    }
}

#[test]
fn test_validate_pipeline_connection() {
    let detector_output = TensorInfo::new(
        "boxes",
        Precision::Fp32,
        "(-1,4)".parse().unwrap(),
        Layout::Unspecified,
    );
    let classifier_input = TensorInfo::new(
        "rois",
        Precision::Undefined,
        "(1:100,4)".parse().unwrap(),
        Layout::Unspecified,
    );

    let info =
        validate_connection("detector", &detector_output, "classifier", &classifier_input)
            .unwrap();
    assert_eq!(info.name(), "rois");
    assert_eq!(info.precision(), Precision::Fp32);
    assert_eq!(info.shape().to_string(), "(1:100,4)");

    let narrow_input = TensorInfo::new(
        "rois",
        Precision::Fp32,
        "(1,5)".parse().unwrap(),
        Layout::Unspecified,
    );
    let err = validate_connection("detector", &detector_output, "classifier", &narrow_input)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "node \"detector\" output \"boxes\" is incompatible with node \"classifier\" input \"rois\": dimension 1 mismatch (4 vs 5)"
    );
}
