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

//! Sample ingestion for Geosel
//!
//! - `source` - the [`BoxSource`] abstraction hosts implement, plus the
//!   optional [`IndexExtentReader`] fast path
//! - `collector` - the scan pass that filters and aggregates a sample

pub mod collector;
pub mod source;

pub use collector::{SampleCollector, SampleDigest};
pub use source::{BoxSource, IndexExtentReader, SampleValue, VecSource};
