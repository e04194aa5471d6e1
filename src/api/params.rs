// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bind variable values
//!
//! Runtime interval models read `$n` values through [`BindVariables`].
//! Values can be supplied as a slice, a `Vec<Value>`, or any [`Params`]
//! collection bound with [`BoundParams::new`].
//!
//! # Examples
//!
//! ```
//! use where_intrinsics::api::{BindVariables, BoundParams};
//! use where_intrinsics::{params, Value};
//!
//! let binds = BoundParams::new(params!["2024-01-01", 42]);
//! assert_eq!(binds.bind_value(0), Some(&Value::text("2024-01-01")));
//! assert_eq!(binds.bind_value(1), Some(&Value::Integer(42)));
//! assert_eq!(binds.bind_value(2), None);
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::Value;

/// Read access to bind variable values
///
/// Indexes are zero-based: `$1` is index 0.
pub trait BindVariables {
    /// Value bound at `index`, or `None` when nothing is bound there
    fn bind_value(&self, index: usize) -> Option<&Value>;
}

impl BindVariables for [Value] {
    fn bind_value(&self, index: usize) -> Option<&Value> {
        self.get(index)
    }
}

impl BindVariables for Vec<Value> {
    fn bind_value(&self, index: usize) -> Option<&Value> {
        self.get(index)
    }
}

impl<const N: usize> BindVariables for [Value; N] {
    fn bind_value(&self, index: usize) -> Option<&Value> {
        self.get(index)
    }
}

/// Trait for types that can be converted to bind values
pub trait ToParam {
    /// Convert self into a Value
    fn to_param(&self) -> Value;
}

impl ToParam for i64 {
    fn to_param(&self) -> Value {
        Value::Integer(*self)
    }
}

impl ToParam for i32 {
    fn to_param(&self) -> Value {
        Value::Integer(*self as i64)
    }
}

impl ToParam for u32 {
    fn to_param(&self) -> Value {
        Value::Integer(*self as i64)
    }
}

impl ToParam for f64 {
    fn to_param(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToParam for bool {
    fn to_param(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl ToParam for String {
    fn to_param(&self) -> Value {
        Value::Text(Arc::from(self.as_str()))
    }
}

impl ToParam for &str {
    fn to_param(&self) -> Value {
        Value::Text(Arc::from(*self))
    }
}

impl ToParam for DateTime<Utc> {
    fn to_param(&self) -> Value {
        Value::Timestamp(self.timestamp_micros())
    }
}

impl ToParam for Value {
    fn to_param(&self) -> Value {
        self.clone()
    }
}

impl<T: ToParam> ToParam for Option<T> {
    fn to_param(&self) -> Value {
        match self {
            Some(v) => v.to_param(),
            None => Value::null_unknown(),
        }
    }
}

impl<T: ToParam> ToParam for &T {
    fn to_param(&self) -> Value {
        (*self).to_param()
    }
}

/// Trait for collections of parameters
pub trait Params {
    /// Convert into a Vec of Values
    fn into_params(self) -> Vec<Value>;
}

impl Params for () {
    fn into_params(self) -> Vec<Value> {
        Vec::new()
    }
}

impl Params for &[Value] {
    fn into_params(self) -> Vec<Value> {
        self.to_vec()
    }
}

impl Params for Vec<Value> {
    fn into_params(self) -> Vec<Value> {
        self
    }
}

impl<const N: usize> Params for [Value; N] {
    fn into_params(self) -> Vec<Value> {
        self.into_iter().collect()
    }
}

macro_rules! impl_params_for_tuple {
    ($($idx:tt: $T:ident),+) => {
        impl<$($T: ToParam),+> Params for ($($T,)+) {
            fn into_params(self) -> Vec<Value> {
                vec![$(self.$idx.to_param()),+]
            }
        }
    };
}

impl_params_for_tuple!(0: T0);
impl_params_for_tuple!(0: T0, 1: T1);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7);

/// Create a bind value list
///
/// ```
/// use where_intrinsics::api::Params;
/// use where_intrinsics::{params, Value};
///
/// let values = params!["2024-01-01T00:00", 10].into_params();
/// assert_eq!(values[1], Value::Integer(10));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ()
    };
    ($($param:expr),+ $(,)?) => {
        ($($param,)+)
    };
}

/// Snapshot of bind values for one execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams {
    values: Vec<Value>,
}

impl BoundParams {
    /// Bind a parameter collection
    pub fn new(params: impl Params) -> Self {
        Self {
            values: params.into_params(),
        }
    }

    /// Replace the value at `index`, growing the list with NULLs if needed
    pub fn set<T: ToParam>(&mut self, index: usize, value: T) {
        if index >= self.values.len() {
            self.values.resize(index + 1, Value::null_unknown());
        }
        self.values[index] = value.to_param();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl BindVariables for BoundParams {
    fn bind_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}
