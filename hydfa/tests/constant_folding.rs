use std::sync::Arc;

use hydfa::{
    SpecialField,
    expr::{BinaryOp, Constant, ConstantEvaluator, ConstantFolder, Expr, UnaryOp},
    factory::ValueFactory,
    member::{FieldMember, MemberOwner, Modifiers},
    tests_utils::{field_qualifier, static_final_field},
    types::Type,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const SEED: u64 = 0x6879_6466_61;

fn fold(expr: &Expr) -> Option<Constant> {
    ConstantFolder::default().compute_constant(expr)
}

#[test]
fn int_arithmetic_matches_wrapping_semantics() {
    let mut rng = ChaCha20Rng::seed_from_u64(SEED);
    for _ in 0..512 {
        let a: i32 = rng.random();
        let b: i32 = rng.random();
        let cases = [
            (BinaryOp::Add, Some(a.wrapping_add(b))),
            (BinaryOp::Sub, Some(a.wrapping_sub(b))),
            (BinaryOp::Mul, Some(a.wrapping_mul(b))),
            (BinaryOp::Div, (b != 0).then(|| a.wrapping_div(b))),
            (BinaryOp::Rem, (b != 0).then(|| a.wrapping_rem(b))),
            (BinaryOp::BitXor, Some(a ^ b)),
        ];
        for (op, expected) in cases {
            let expr = Expr::binary(op, Expr::int(a), Expr::int(b));
            assert_eq!(
                fold(&expr),
                expected.map(Constant::Int),
                "{} {:?} {}",
                a,
                op,
                b
            );
        }
    }
}

#[test]
fn long_arithmetic_matches_wrapping_semantics() {
    let mut rng = ChaCha20Rng::seed_from_u64(SEED + 1);
    for _ in 0..512 {
        let a: i64 = rng.random();
        let b: i32 = rng.random();
        let expr = Expr::binary(
            BinaryOp::Sub,
            Expr::Literal(Constant::Long(a)),
            Expr::int(b),
        );
        assert_eq!(fold(&expr), Some(Constant::Long(a.wrapping_sub(b as i64))));

        let negated = Expr::unary(UnaryOp::Neg, Expr::Literal(Constant::Long(a)));
        assert_eq!(fold(&negated), Some(Constant::Long(a.wrapping_neg())));
    }
}

#[test]
fn random_array_dimensions_fold_into_array_length() {
    let factory = ValueFactory::default();
    let mut rng = ChaCha20Rng::seed_from_u64(SEED + 2);
    for i in 0..64 {
        let lhs = rng.random_range(0..1000);
        let rhs = rng.random_range(0..1000);
        let field = static_final_field(
            &format!("A{}", i),
            Type::array_of(Type::INT),
            Expr::new_array(
                Type::INT,
                Expr::binary(BinaryOp::Add, Expr::int(lhs), Expr::int(rhs)),
            ),
        );
        assert_eq!(
            SpecialField::ArrayLength.create_value(&factory, Some(&field_qualifier(&factory, field))),
            factory.int(lhs + rhs)
        );
    }
}

#[test]
fn long_dimension_does_not_fold() {
    let factory = ValueFactory::default();
    let field = static_final_field(
        "A",
        Type::array_of(Type::INT),
        Expr::new_array(Type::INT, Expr::Literal(Constant::Long(5))),
    );
    let value =
        SpecialField::ArrayLength.create_value(&factory, Some(&field_qualifier(&factory, field)));
    assert!(value.is_variable(), "expected field access, got {}", value);
}

#[test]
fn field_references_are_followed_up_to_the_depth_limit() {
    let owner = MemberOwner::Class("com.example.Chain".into());
    let mut field = FieldMember::new(owner.clone(), "F0", Type::INT)
        .with_modifiers(Modifiers::STATIC | Modifiers::FINAL)
        .with_initializer(Expr::int(42));
    for i in 1..=ConstantFolder::DEFAULT_MAX_FIELD_DEPTH {
        field = FieldMember::new(owner.clone(), format!("F{}", i), Type::INT)
            .with_modifiers(Modifiers::STATIC | Modifiers::FINAL)
            .with_initializer(Expr::FieldRef(Arc::new(field)));
    }

    let within = ConstantFolder {
        max_field_depth: ConstantFolder::DEFAULT_MAX_FIELD_DEPTH + 1,
    };
    let reference = Expr::FieldRef(Arc::new(field));
    assert_eq!(within.compute_constant(&reference), Some(Constant::Int(42)));
    assert_eq!(ConstantFolder::default().compute_constant(&reference), None);
}

#[test]
fn non_final_field_reference_does_not_fold() {
    let field = FieldMember::new(MemberOwner::Class("com.example.Mutable".into()), "N", Type::INT)
        .with_modifiers(Modifiers::STATIC)
        .with_initializer(Expr::int(3));
    assert_eq!(fold(&Expr::FieldRef(Arc::new(field))), None);
}
