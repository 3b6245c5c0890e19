// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Constants for zkhe presets
//!
//! Every preset fixes three parameter sets: the proof ring `Z_Q[X]/(X^N + 1)`, the BFV scheme
//! whose ciphertexts are evaluated, and the BFV parameters of the linear-only encoding that
//! hides proof-ring elements. Encoding sets use each proof modulus as plaintext modulus and
//! a degree of `4N`, so every encoding modulus is `≡ 1 (mod 8N)`.

/// Small test preset (proof degree 16) - DO NOT USE IN PRODUCTION
pub mod insecure_16 {
    /// Proof ring
    pub mod proof {
        pub const DEGREE: usize = 16;
        pub const MODULI: &[u64] = &[0x3ffffe81, 0x3ffff781];
    }

    /// Homomorphic scheme
    pub mod he {
        pub const DEGREE: usize = 2048;
        pub const PLAINTEXT_MODULUS: u64 = 1032193;
        pub const MODULI: &[u64] = &[0x0008000000820001, 0x0010000000060001, 0x00100000003e0001];
    }

    /// Linear-only encoding
    pub mod encoding {
        pub const DEGREE: usize = 64;
        pub const MODULI: &[u64] = &[0xffffffffffff601, 0xffffffffffff581, 0xfffffffffffef81];
    }
}

/// Standard preset (proof degree 2048)
pub mod standard_2048 {
    pub mod proof {
        pub const DEGREE: usize = 2048;
        pub const MODULI: &[u64] = &[0x3fff4001, 0x3ffe8001];
    }

    pub mod he {
        pub const DEGREE: usize = 8192;
        pub const PLAINTEXT_MODULUS: u64 = 1032193;
        pub const MODULI: &[u64] = &[
            0x0008000000820001,
            0x0010000000060001,
            0x00100000003e0001,
            0x00100000006e0001,
        ];
    }

    pub mod encoding {
        pub const DEGREE: usize = 8192;
        pub const MODULI: &[u64] = &[0xfffffffffffc001, 0xffffffffffe8001, 0xffffffffffd8001];
    }
}

/// Ratio between the encoding degree and the proof degree
pub const ENCODING_DEGREE_FACTOR: usize = 4;
