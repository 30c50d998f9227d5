//! 带单位的数值（`ValueWithUnits`）
//!
//! TCode 中所有物理量（体积、速度、长度、时间、角度）都以
//! `{magnitude, units}` 的形式在线路上传输。本模块提供：
//!
//! - 单位字符串解析（量纲分析）
//! - 单位换算 [`ValueWithUnits::to`]
//! - 带换算的加减法与比较（右操作数换算到左操作数的单位）
//! - 常用构造函数 [`mm`]、[`m`]、[`rad`]、[`ul`]、[`ul_per_s`]、[`s`]
//!
//! # 示例
//!
//! ```rust
//! use tcode_protocol::units::{mm, m, ValueWithUnits};
//!
//! let sum = mm(5.0).checked_add(&m(0.01)).unwrap();
//! assert_eq!(sum, mm(15.0));
//! assert_eq!(sum.units, "mm");
//!
//! // 量纲不兼容
//! let err = ValueWithUnits::new(0.0, "kg").checked_add(&m(0.0));
//! assert!(err.is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Mul, Neg};
use thiserror::Error;

/// 单位错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitsError {
    /// 无法解析的单位字符串
    #[error("Unknown unit: {0:?}")]
    UnknownUnit(String),

    /// 量纲不兼容（如质量与长度）
    #[error("Incompatible units: cannot convert '{from}' to '{to}'")]
    Incompatible { from: String, to: String },

    /// 数值不是有限数
    #[error("Magnitude is not finite: {0}")]
    NotFinite(f64),
}

/// 基本量纲的指数：长度、质量、时间、角度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimension {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub angle: i8,
}

impl Dimension {
    pub const NONE: Self = Self::new(0, 0, 0, 0);
    pub const LENGTH: Self = Self::new(1, 0, 0, 0);
    pub const VOLUME: Self = Self::new(3, 0, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0);
    pub const MASS: Self = Self::new(0, 1, 0, 0);
    pub const ANGLE: Self = Self::new(0, 0, 0, 1);
    pub const FLOW_RATE: Self = Self::new(3, 0, -1, 0);
    pub const FORCE: Self = Self::new(1, 1, -2, 0);

    pub const fn new(length: i8, mass: i8, time: i8, angle: i8) -> Self {
        Self {
            length,
            mass,
            time,
            angle,
        }
    }

    /// 指数超出 `i8` 时返回 `None`
    fn checked_powi(self, exp: i8) -> Option<Self> {
        Some(Self::new(
            self.length.checked_mul(exp)?,
            self.mass.checked_mul(exp)?,
            self.time.checked_mul(exp)?,
            self.angle.checked_mul(exp)?,
        ))
    }

    fn checked_combine(self, other: Self) -> Option<Self> {
        Some(Self::new(
            self.length.checked_add(other.length)?,
            self.mass.checked_add(other.mass)?,
            self.time.checked_add(other.time)?,
            self.angle.checked_add(other.angle)?,
        ))
    }
}

/// 解析后的单位：相对 SI 基本单位的比例因子 + 量纲
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub factor: f64,
    pub dimension: Dimension,
}

impl Unit {
    const DIMENSIONLESS: Self = Self {
        factor: 1.0,
        dimension: Dimension::NONE,
    };

    /// 解析单位字符串
    ///
    /// 支持 `*` / `·` 连接的乘积、`/` 分隔的分母，
    /// 以及 `^n`、`**n`、`²`、`³` 形式的指数，例如
    /// `"uL/s"`、`"microliters/second"`、`"mm^3"`、`"m/s**2"`。
    pub fn parse(units: &str) -> Result<Self, UnitsError> {
        let normalized: String = units
            .replace("**", "^")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if normalized.is_empty() || normalized == "dimensionless" {
            return Ok(Self::DIMENSIONLESS);
        }

        let mut result = Self::DIMENSIONLESS;
        for (i, segment) in normalized.split('/').enumerate() {
            let sign: i8 = if i == 0 { 1 } else { -1 };
            for factor in segment.split(['*', '·']) {
                if factor.is_empty() {
                    return Err(UnitsError::UnknownUnit(units.to_string()));
                }
                let (base, exp) = split_exponent(factor)
                    .ok_or_else(|| UnitsError::UnknownUnit(units.to_string()))?;
                let unit =
                    lookup(base).ok_or_else(|| UnitsError::UnknownUnit(units.to_string()))?;
                let (exp, dimension) = raise(result.dimension, unit.dimension, exp, sign)
                    .ok_or_else(|| UnitsError::UnknownUnit(units.to_string()))?;
                let factor = result.factor * unit.factor.powi(exp as i32);
                if !factor.is_finite() || factor == 0.0 {
                    return Err(UnitsError::UnknownUnit(units.to_string()));
                }
                result = Self { factor, dimension };
            }
        }
        Ok(result)
    }

    /// 是否与另一单位量纲兼容
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }
}

/// `acc · unit^(exp·sign)` 的量纲；任一指数溢出 `i8` 时返回 `None`
fn raise(acc: Dimension, unit: Dimension, exp: i8, sign: i8) -> Option<(i8, Dimension)> {
    let exp = exp.checked_mul(sign)?;
    let dimension = acc.checked_combine(unit.checked_powi(exp)?)?;
    Some((exp, dimension))
}

fn split_exponent(factor: &str) -> Option<(&str, i8)> {
    if let Some((base, exp)) = factor.split_once('^') {
        return Some((base, exp.parse().ok()?));
    }
    if let Some(base) = factor.strip_suffix('²') {
        return Some((base, 2));
    }
    if let Some(base) = factor.strip_suffix('³') {
        return Some((base, 3));
    }
    Some((factor, 1))
}

const fn unit(factor: f64, dimension: Dimension) -> Unit {
    Unit { factor, dimension }
}

fn lookup(name: &str) -> Option<Unit> {
    use Dimension as D;

    let found = match name {
        // 长度
        "m" | "meter" | "meters" | "metre" | "metres" => unit(1.0, D::LENGTH),
        "km" | "kilometer" | "kilometers" => unit(1e3, D::LENGTH),
        "cm" | "centimeter" | "centimeters" => unit(1e-2, D::LENGTH),
        "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
            unit(1e-3, D::LENGTH)
        },
        "um" | "µm" | "μm" | "micrometer" | "micrometers" | "micron" | "microns" => {
            unit(1e-6, D::LENGTH)
        },
        "nm" | "nanometer" | "nanometers" => unit(1e-9, D::LENGTH),
        "in" | "inch" | "inches" => unit(0.0254, D::LENGTH),

        // 体积
        "L" | "l" | "liter" | "liters" | "litre" | "litres" => unit(1e-3, D::VOLUME),
        "mL" | "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
            unit(1e-6, D::VOLUME)
        },
        "uL" | "ul" | "µL" | "μL" | "µl" | "microliter" | "microliters" | "microlitre"
        | "microlitres" => unit(1e-9, D::VOLUME),
        "nL" | "nl" | "nanoliter" | "nanoliters" => unit(1e-12, D::VOLUME),

        // 时间
        "s" | "sec" | "second" | "seconds" => unit(1.0, D::TIME),
        "ms" | "millisecond" | "milliseconds" => unit(1e-3, D::TIME),
        "us" | "µs" | "microsecond" | "microseconds" => unit(1e-6, D::TIME),
        "min" | "minute" | "minutes" => unit(60.0, D::TIME),
        "h" | "hr" | "hour" | "hours" => unit(3600.0, D::TIME),

        // 质量
        "kg" | "kilogram" | "kilograms" => unit(1.0, D::MASS),
        "g" | "gram" | "grams" => unit(1e-3, D::MASS),
        "mg" | "milligram" | "milligrams" => unit(1e-6, D::MASS),
        "ug" | "µg" | "microgram" | "micrograms" => unit(1e-9, D::MASS),

        // 角度
        "rad" | "radian" | "radians" => unit(1.0, D::ANGLE),
        "mrad" | "milliradian" | "milliradians" => unit(1e-3, D::ANGLE),
        "deg" | "degree" | "degrees" | "°" => unit(std::f64::consts::PI / 180.0, D::ANGLE),

        // 力
        "N" | "newton" | "newtons" => unit(1.0, D::FORCE),
        "mN" | "millinewton" | "millinewtons" => unit(1e-3, D::FORCE),

        _ => return None,
    };
    Some(found)
}

/// 带单位的数值
///
/// 线路格式：`{"type": "ValueWithUnits", "magnitude": 5.0, "units": "mm"}`
///
/// # 相等性
///
/// `==` 会先把右操作数换算到左操作数的单位，再以相对误差 1e-9 比较。
/// 量纲不兼容的两个值永远不相等，`partial_cmp` 返回 `None`。
/// 哈希只依赖 `(magnitude, units)` 原始值，同一对值的哈希稳定。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename = "ValueWithUnits")]
pub struct ValueWithUnits {
    pub magnitude: f64,
    pub units: String,
}

const RELATIVE_TOLERANCE: f64 = 1e-9;
const ABSOLUTE_TOLERANCE: f64 = 1e-12;

fn approx_eq(a: f64, b: f64) -> bool {
    let diff = (a - b).abs();
    diff <= ABSOLUTE_TOLERANCE || diff <= RELATIVE_TOLERANCE * a.abs().max(b.abs())
}

impl ValueWithUnits {
    /// 创建新的数值
    pub fn new(magnitude: f64, units: impl Into<String>) -> Self {
        Self {
            magnitude,
            units: units.into(),
        }
    }

    /// 解析本数值的单位
    pub fn unit(&self) -> Result<Unit, UnitsError> {
        Unit::parse(&self.units)
    }

    /// 量纲
    pub fn dimension(&self) -> Result<Dimension, UnitsError> {
        Ok(self.unit()?.dimension)
    }

    /// 换算到目标单位
    ///
    /// 单位字符串完全相同时直接返回副本，不做解析。
    pub fn to(&self, units: &str) -> Result<ValueWithUnits, UnitsError> {
        if self.units == units {
            return Ok(self.clone());
        }
        if !self.magnitude.is_finite() {
            return Err(UnitsError::NotFinite(self.magnitude));
        }

        let from = self.unit()?;
        let to = Unit::parse(units)?;
        if !from.is_compatible(&to) {
            return Err(UnitsError::Incompatible {
                from: self.units.clone(),
                to: units.to_string(),
            });
        }

        Ok(ValueWithUnits::new(
            self.magnitude * (from.factor / to.factor),
            units,
        ))
    }

    /// 换算到目标单位后取数值
    pub fn magnitude_in(&self, units: &str) -> Result<f64, UnitsError> {
        Ok(self.to(units)?.magnitude)
    }

    /// 加法（结果使用左操作数的单位）
    pub fn checked_add(&self, rhs: &ValueWithUnits) -> Result<ValueWithUnits, UnitsError> {
        let rhs = rhs.to(&self.units)?;
        Ok(ValueWithUnits::new(self.magnitude + rhs.magnitude, self.units.clone()))
    }

    /// 减法（结果使用左操作数的单位）
    pub fn checked_sub(&self, rhs: &ValueWithUnits) -> Result<ValueWithUnits, UnitsError> {
        let rhs = rhs.to(&self.units)?;
        Ok(ValueWithUnits::new(self.magnitude - rhs.magnitude, self.units.clone()))
    }

    /// 带换算的相等比较
    pub fn try_eq(&self, other: &ValueWithUnits) -> Result<bool, UnitsError> {
        let other = other.to(&self.units)?;
        Ok(approx_eq(self.magnitude, other.magnitude))
    }

    /// 带换算的大小比较
    pub fn try_cmp(&self, other: &ValueWithUnits) -> Result<Option<Ordering>, UnitsError> {
        let other = other.to(&self.units)?;
        if approx_eq(self.magnitude, other.magnitude) {
            return Ok(Some(Ordering::Equal));
        }
        Ok(self.magnitude.partial_cmp(&other.magnitude))
    }
}

impl PartialEq for ValueWithUnits {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl PartialOrd for ValueWithUnits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok().flatten()
    }
}

impl Hash for ValueWithUnits {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // -0.0 与 0.0 视为同一值
        let magnitude = if self.magnitude == 0.0 {
            0.0f64
        } else {
            self.magnitude
        };
        magnitude.to_bits().hash(state);
        self.units.hash(state);
    }
}

impl fmt::Display for ValueWithUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.units)
    }
}

impl Mul<f64> for ValueWithUnits {
    type Output = ValueWithUnits;

    fn mul(self, rhs: f64) -> ValueWithUnits {
        ValueWithUnits::new(self.magnitude * rhs, self.units)
    }
}

impl Mul<f64> for &ValueWithUnits {
    type Output = ValueWithUnits;

    fn mul(self, rhs: f64) -> ValueWithUnits {
        ValueWithUnits::new(self.magnitude * rhs, self.units.clone())
    }
}

impl Mul<ValueWithUnits> for f64 {
    type Output = ValueWithUnits;

    fn mul(self, rhs: ValueWithUnits) -> ValueWithUnits {
        rhs * self
    }
}

impl Neg for ValueWithUnits {
    type Output = ValueWithUnits;

    fn neg(self) -> ValueWithUnits {
        ValueWithUnits::new(-self.magnitude, self.units)
    }
}

// 常用构造函数

/// 毫米
pub fn mm(length: f64) -> ValueWithUnits {
    ValueWithUnits::new(length, "mm")
}

/// 米
pub fn m(length: f64) -> ValueWithUnits {
    ValueWithUnits::new(length, "m")
}

/// 弧度
pub fn rad(angle: f64) -> ValueWithUnits {
    ValueWithUnits::new(angle, "rad")
}

/// 微升
pub fn ul(volume: f64) -> ValueWithUnits {
    ValueWithUnits::new(volume, "uL")
}

/// 微升每秒
pub fn ul_per_s(rate: f64) -> ValueWithUnits {
    ValueWithUnits::new(rate, "uL/s")
}

/// 秒
pub fn s(seconds: f64) -> ValueWithUnits {
    ValueWithUnits::new(seconds, "s")
}
