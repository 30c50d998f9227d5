//! 带单位数值的属性测试
//!
//! 使用 proptest 验证换算与运算的代数性质。

use proptest::prelude::*;
use tcode_protocol::units::{m, mm, ul, ul_per_s};
use tcode_protocol::{
    Aspirate, ProtocolError, SchemaVersion, TCode, Unit, UnitsError, ValueWithUnits,
};

proptest! {
    /// 测试 mm → m → mm 往返换算
    #[test]
    fn length_conversion_roundtrip(value in -1.0e4..1.0e4f64) {
        let back = mm(value).to("m").unwrap().to("mm").unwrap();
        prop_assert!((back.magnitude - value).abs() <= 1e-9 * value.abs().max(1.0));
        prop_assert_eq!(back.units, "mm");
    }

    /// 测试换算后的值与原值相等
    #[test]
    fn converted_value_equals_original(value in -1.0e3..1.0e3f64) {
        let length = m(value);
        prop_assert_eq!(length.to("mm").unwrap(), length.clone());
        prop_assert_eq!(length.to("cm").unwrap(), length);
    }

    /// 测试加法结果使用左操作数单位
    #[test]
    fn addition_uses_left_units(a in -1.0e3..1.0e3f64, b in -1.0..1.0f64) {
        let sum = mm(a).checked_add(&m(b)).unwrap();
        prop_assert_eq!(&sum.units, "mm");
        prop_assert!((sum.magnitude - (a + b * 1000.0)).abs() < 1e-6);
    }

    /// 测试加减互逆
    #[test]
    fn add_then_sub_is_identity(a in -1.0e3..1.0e3f64, b in -1.0e3..1.0e3f64) {
        let x = ul(a);
        let y = ValueWithUnits::new(b, "nL");
        let back = x.checked_add(&y).unwrap().checked_sub(&y).unwrap();
        prop_assert!((back.magnitude - a).abs() < 1e-9);
    }

    /// 测试标量乘法与取负不改变单位
    #[test]
    fn scalar_ops_keep_units(a in -1.0e3..1.0e3f64, k in -10.0..10.0f64) {
        let scaled = mm(a) * k;
        prop_assert_eq!(&scaled.units, "mm");
        prop_assert_eq!(scaled.magnitude, a * k);

        let negated = -mm(a);
        prop_assert_eq!(negated.magnitude, -a);
    }

    /// 测试比较与换算一致
    #[test]
    fn ordering_respects_conversion(a in 0.0..1.0e3f64, delta in 1.0..10.0f64) {
        let small = mm(a);
        let large = m((a + delta) / 1000.0);
        prop_assert!(small < large);
        prop_assert!(large > small);
    }

    /// 测试量纲不兼容时总是报错
    #[test]
    fn incompatible_units_always_fail(a in -1.0e3..1.0e3f64, b in -1.0e3..1.0e3f64) {
        let mass = ValueWithUnits::new(a, "kg");
        let length = m(b);
        let incompatible = matches!(
            mass.checked_add(&length),
            Err(UnitsError::Incompatible { .. })
        );
        prop_assert!(incompatible);
        prop_assert!(mass.try_eq(&length).is_err());
        prop_assert!(mass.partial_cmp(&length).is_none());
    }

    /// 测试任意指数都不会让解析 panic
    #[test]
    fn any_exponent_parses_without_panic(
        exp in any::<i8>(),
        base in prop::sample::select(vec!["m", "L", "uL", "s", "km"]),
    ) {
        let _ = Unit::parse(&format!("{}^{}", base, exp));
        let _ = Unit::parse(&format!("s/{}^{}", base, exp));
        let _ = Unit::parse(&format!("{}^{}*{}^{}", base, exp, base, exp));
    }
}

#[test]
fn test_reference_values() {
    let sum = mm(5.0).checked_add(&m(0.01)).unwrap();
    assert_eq!(sum, mm(15.0));
    assert_eq!(sum.units, "mm");
    assert!((sum.magnitude - 15.0).abs() < 1e-12);

    assert!(
        ValueWithUnits::new(0.0, "kg")
            .checked_add(&m(0.0))
            .is_err()
    );
    assert_eq!(m(0.01), mm(10.0));
}

#[test]
fn test_exponent_overflow_is_unknown_unit() {
    for units in ["L^50", "uL^60", "s/m^-128", "m^100*m^100", "km^127"] {
        let err = Unit::parse(units).unwrap_err();
        assert_eq!(err, UnitsError::UnknownUnit(units.to_string()), "{}", units);
        assert!(ValueWithUnits::new(1.0, units).to("m").is_err());
    }
    // 边界内的指数仍然有效
    assert!(Unit::parse("m^42").is_ok());
}

#[test]
fn test_overflowing_units_fail_payload_check() {
    let command: TCode = Aspirate {
        schema_version: SchemaVersion,
        robot_id: "r0".into(),
        volume: ValueWithUnits::new(100.0, "uL^60"),
        speed: ul_per_s(25.0),
    }
    .into();

    let err = command.check_payload().unwrap_err();
    assert!(matches!(err, ProtocolError::Units(UnitsError::UnknownUnit(_))));
}
