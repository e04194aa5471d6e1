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

//! Execution-time inputs
//!
//! Parameter binding for runtime interval evaluation:
//!
//! ```
//! use where_intrinsics::api::BoundParams;
//! use where_intrinsics::params;
//!
//! // Tuple syntax
//! let a = BoundParams::new(("2024-01-01", 10));
//!
//! // params! macro
//! let b = BoundParams::new(params!["2024-01-01", 10]);
//! assert_eq!(a, b);
//! ```

pub mod params;

pub use params::{BindVariables, BoundParams, Params, ToParam};
