// Copyright 2025 JiangLong.
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

//! Exposing KubeVirt resources as Services

pub mod exposer;
pub mod params;
pub mod selector;

pub use self::exposer::{ExposeOutcome, Exposer};
pub use self::params::{
    parse_target_port, Protocol, ResourceKind, ResourceRef, ServiceParams, ServiceType,
};
