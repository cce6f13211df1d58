// Copyright 2025 eraflo
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

//! Input and window events, and the bounded queue that carries them from the
//! platform layer to the frame loop.

mod queue;
mod types;

pub use queue::{Drain, EventQueue, DEFAULT_EVENT_QUEUE_CAPACITY};
pub use types::{Event, EventKind, KeyCode, MouseButton};
