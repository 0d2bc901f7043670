use herk::layout::{MatrixLayoutSpec, Operand, Order, Transpose, resolve, resolve_a, resolve_c};
use herk::LayoutError;
use proptest::prelude::*;

const ORDERS: [Order; 2] = [Order::RowMajor, Order::ColumnMajor];
const TRANSPOSES: [Transpose; 3] = [Transpose::NoTrans, Transpose::Trans, Transpose::ConjTrans];

/// (vectors of A, minimum lda) for a given order/transpose.
fn expected_a(order: Order, trans: Transpose, n: usize, k: usize) -> (usize, usize) {
    match (order, trans) {
        (Order::RowMajor, Transpose::NoTrans) => (n, k),
        (Order::RowMajor, _) => (k, n),
        (Order::ColumnMajor, Transpose::NoTrans) => (k, n),
        (Order::ColumnMajor, _) => (n, k),
    }
}

// ============================================================
// Auto-fill
// ============================================================

#[test]
fn test_auto_leading_dims_match_table() {
    let (n, k) = (7, 3);

    for order in ORDERS {
        for trans in TRANSPOSES {
            let layout = resolve(&MatrixLayoutSpec::new(order, trans, n, k)).unwrap();
            let (vectors, minimum) = expected_a(order, trans, n, k);

            assert_eq!(layout.a_vectors, vectors, "{:?}/{:?}", order, trans);
            assert_eq!(layout.lda, minimum, "{:?}/{:?}", order, trans);
            assert_eq!(layout.c_vectors, n);
            assert_eq!(layout.ldc, n);
        }
    }
}

#[test]
fn test_element_counts_for_small_row_major() {
    let spec = MatrixLayoutSpec::new(Order::RowMajor, Transpose::NoTrans, 4, 3);
    let layout = resolve(&spec).unwrap();

    assert_eq!(layout.a_vectors, 4);
    assert_eq!(layout.lda, 3);
    assert_eq!(layout.c_vectors, 4);
    assert_eq!(layout.ldc, 4);
    assert_eq!(layout.element_count(Operand::A, 2).unwrap(), 14);
    assert_eq!(layout.element_count(Operand::C, 0).unwrap(), 16);
    assert_eq!(layout.host_len(Operand::A).unwrap(), 12);
}

// ============================================================
// Minimum enforcement
// ============================================================

#[test]
fn test_lda_one_below_minimum_is_rejected() {
    let (n, k) = (9, 5);

    for order in ORDERS {
        for trans in TRANSPOSES {
            let (_, minimum) = expected_a(order, trans, n, k);
            let spec = MatrixLayoutSpec::new(order, trans, n, k).with_lda(minimum - 1);

            assert_eq!(
                resolve(&spec),
                Err(LayoutError::LeadingDimensionTooSmall {
                    operand: Operand::A,
                    requested: minimum - 1,
                    minimum,
                }),
                "{:?}/{:?}",
                order,
                trans
            );
        }
    }
}

#[test]
fn test_lda_at_minimum_is_kept_verbatim() {
    let (n, k) = (9, 5);

    for order in ORDERS {
        for trans in TRANSPOSES {
            let (_, minimum) = expected_a(order, trans, n, k);
            let spec = MatrixLayoutSpec::new(order, trans, n, k).with_lda(minimum);
            assert_eq!(resolve(&spec).unwrap().lda, minimum);

            let padded = spec.with_lda(minimum + 13);
            assert_eq!(resolve(&padded).unwrap().lda, minimum + 13);
        }
    }
}

#[test]
fn test_ldc_below_n_is_rejected() {
    let spec = MatrixLayoutSpec::new(Order::ColumnMajor, Transpose::NoTrans, 8, 2).with_ldc(7);
    assert_eq!(
        resolve(&spec),
        Err(LayoutError::LeadingDimensionTooSmall {
            operand: Operand::C,
            requested: 7,
            minimum: 8,
        })
    );

    let ok = spec.with_ldc(8);
    assert_eq!(resolve(&ok).unwrap().ldc, 8);
}

#[test]
fn test_c_is_reported_first_when_both_are_too_small() {
    let spec = MatrixLayoutSpec::new(Order::RowMajor, Transpose::NoTrans, 8, 4)
        .with_lda(1)
        .with_ldc(1);

    match resolve(&spec) {
        Err(LayoutError::LeadingDimensionTooSmall { operand, .. }) => assert_eq!(operand, Operand::C),
        other => panic!("expected LeadingDimensionTooSmall, got {:?}", other),
    }
    assert!(resolve_c(&spec).is_err());
    assert!(resolve_a(&spec).is_err());
}

// ============================================================
// Degenerate inputs
// ============================================================

#[test]
fn test_k_equal_n_boundary() {
    let n = 6;

    for order in ORDERS {
        for trans in TRANSPOSES {
            let layout = resolve(&MatrixLayoutSpec::new(order, trans, n, n)).unwrap();
            assert_eq!(layout.lda, n);
            assert_eq!(layout.a_vectors, n);

            let below = MatrixLayoutSpec::new(order, trans, n, n).with_lda(n - 1);
            assert!(resolve(&below).is_err());
        }
    }
}

#[test]
fn test_one_by_one() {
    let layout = resolve(&MatrixLayoutSpec::new(Order::RowMajor, Transpose::ConjTrans, 1, 1)).unwrap();
    assert_eq!((layout.lda, layout.a_vectors, layout.ldc, layout.c_vectors), (1, 1, 1, 1));
}

#[test]
fn test_zero_dimensions_are_rejected() {
    let zero_n = MatrixLayoutSpec::new(Order::RowMajor, Transpose::NoTrans, 0, 4);
    assert_eq!(resolve(&zero_n), Err(LayoutError::ZeroDimension { dim: 'n' }));

    let zero_k = MatrixLayoutSpec::new(Order::ColumnMajor, Transpose::NoTrans, 4, 0);
    assert_eq!(resolve(&zero_k), Err(LayoutError::ZeroDimension { dim: 'k' }));
}

#[test]
fn test_element_count_overflow() {
    let spec = MatrixLayoutSpec::new(Order::RowMajor, Transpose::NoTrans, 2, 2).with_lda(usize::MAX / 2 + 1);
    let layout = resolve(&spec).unwrap();
    assert_eq!(
        layout.element_count(Operand::A, 0),
        Err(LayoutError::Overflow { operand: Operand::A })
    );
    assert_eq!(layout.host_len(Operand::A), Err(LayoutError::Overflow { operand: Operand::A }));
    assert_eq!(layout.host_len(Operand::C).unwrap(), 4);
}

#[test]
fn test_offset_pushes_element_count_over_the_edge() {
    let spec = MatrixLayoutSpec::new(Order::ColumnMajor, Transpose::NoTrans, 1, 1).with_ldc(usize::MAX);
    let layout = resolve(&spec).unwrap();

    assert_eq!(layout.element_count(Operand::C, 0).unwrap(), usize::MAX);
    assert_eq!(
        layout.element_count(Operand::C, 1),
        Err(LayoutError::Overflow { operand: Operand::C })
    );
}

#[test]
fn test_enum_parsing() {
    assert_eq!("row".parse::<Order>().unwrap(), Order::RowMajor);
    assert_eq!("C".parse::<Order>().unwrap(), Order::ColumnMajor);
    assert_eq!("c".parse::<Transpose>().unwrap(), Transpose::ConjTrans);
    assert_eq!("T".parse::<Transpose>().unwrap(), Transpose::Trans);
    assert!("x".parse::<Transpose>().is_err());
    assert_eq!(Transpose::ConjTrans.to_string(), "C");
}

// ============================================================
// Properties
// ============================================================

fn arb_order() -> impl Strategy<Value = Order> {
    prop_oneof![Just(Order::RowMajor), Just(Order::ColumnMajor)]
}

fn arb_transpose() -> impl Strategy<Value = Transpose> {
    prop_oneof![
        Just(Transpose::NoTrans),
        Just(Transpose::Trans),
        Just(Transpose::ConjTrans)
    ]
}

fn arb_spec() -> impl Strategy<Value = MatrixLayoutSpec> {
    (arb_order(), arb_transpose(), 1usize..200, 1usize..200, 0usize..300, 0usize..300).prop_map(
        |(order, trans_a, n, k, lda, ldc)| MatrixLayoutSpec {
            order,
            trans_a,
            n,
            k,
            lda,
            ldc,
        },
    )
}

proptest! {
    #[test]
    fn resolve_is_deterministic(spec in arb_spec()) {
        prop_assert_eq!(resolve(&spec), resolve(&spec));
    }

    #[test]
    fn resolved_layout_never_undercuts_minimum(spec in arb_spec()) {
        if let Ok(layout) = resolve(&spec) {
            let (vectors, minimum) = expected_a(spec.order, spec.trans_a, spec.n, spec.k);
            prop_assert_eq!(layout.a_vectors, vectors);
            prop_assert!(layout.lda >= minimum);
            prop_assert!(layout.ldc >= spec.n);
            if spec.lda != 0 {
                prop_assert_eq!(layout.lda, spec.lda);
            }
            if spec.ldc != 0 {
                prop_assert_eq!(layout.ldc, spec.ldc);
            }
        }
    }

    #[test]
    fn c_layout_ignores_order_and_transpose(
        spec in arb_spec(),
        order in arb_order(),
        trans in arb_transpose(),
    ) {
        let other = MatrixLayoutSpec { order, trans_a: trans, ..spec };
        prop_assert_eq!(resolve_c(&spec), resolve_c(&other));
    }
}
