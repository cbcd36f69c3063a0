// Copyright 2025 Geosel Contributors
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

//! Core types for Geosel
//!
//! Bounding-box primitives, the error type, and the cancellation flag
//! shared by the collection and build passes.

pub mod bounds;
pub mod cancel;
pub mod error;

pub use bounds::{
    FeatureBounds, NdBox, NdCellRange, MAX_DIMENSION_WIDTH, MIN_DIMENSION_WIDTH, ND_DIMS,
};
pub use cancel::CancelFlag;
pub use error::{Error, Result};
