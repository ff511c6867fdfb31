// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard modifiers held during a mouse event.

bitflags::bitflags! {
    /// Modifier keys.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Control.
        const CTRL = 1 << 1;
        /// Alt, Option on macOS.
        const ALT = 1 << 2;
        /// Meta: Command on macOS, the Windows key elsewhere.
        const META = 1 << 3;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::empty()
    }
}

impl Modifiers {
    /// The platform's "toggle selection" modifier: Meta on macOS, Ctrl elsewhere.
    pub fn is_toggle(self, mac: bool) -> bool {
        if mac {
            self.contains(Self::META)
        } else {
            self.contains(Self::CTRL)
        }
    }
}
