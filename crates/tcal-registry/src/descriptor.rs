/// One row of the compile-time format table (spec §4.1). `extensions` is a
/// semicolon-delimited token list; matching is case-insensitive.
#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    pub name: &'static str,
    pub extensions: &'static str,
    pub molecule_capable: bool,
    pub trajectory_capable: bool,
}

impl FormatDescriptor {
    fn matches_ext(&self, ext: &str) -> bool {
        self.extensions
            .split(';')
            .any(|token| token.eq_ignore_ascii_case(ext))
    }
}

/// Extension tokens recognized by this build (spec §4.1): `pdb, gro, xtc,
/// trr, xyz, xmol, arc, cif, data`. Molecule-capable vs trajectory-capable
/// vs both is kept explicit per entry rather than inferred.
pub const BUILTIN_FORMATS: &[FormatDescriptor] = &[
    FormatDescriptor {
        name: "PDB",
        extensions: "pdb",
        molecule_capable: true,
        trajectory_capable: true,
    },
    FormatDescriptor {
        name: "GRO",
        extensions: "gro",
        molecule_capable: true,
        trajectory_capable: false,
    },
    FormatDescriptor {
        name: "XTC",
        extensions: "xtc",
        molecule_capable: false,
        trajectory_capable: true,
    },
    FormatDescriptor {
        name: "TRR",
        extensions: "trr",
        molecule_capable: false,
        trajectory_capable: true,
    },
    FormatDescriptor {
        name: "XYZ",
        extensions: "xyz;xmol;arc",
        molecule_capable: true,
        trajectory_capable: true,
    },
    FormatDescriptor {
        name: "mmCIF",
        extensions: "cif",
        molecule_capable: true,
        trajectory_capable: false,
    },
    FormatDescriptor {
        name: "LAMMPS Data",
        extensions: "data",
        molecule_capable: true,
        trajectory_capable: false,
    },
];

/// Finds the descriptor whose extension list contains `ext`
/// (case-insensitive). Linear scan over the small compile-time table, per
/// spec §4.1.
pub fn descriptor_for_ext(ext: &str) -> Option<&'static FormatDescriptor> {
    BUILTIN_FORMATS.iter().find(|d| d.matches_ext(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_lookup_is_case_insensitive() {
        assert_eq!(descriptor_for_ext("PDB").unwrap().name, "PDB");
        assert_eq!(descriptor_for_ext("pdb").unwrap().name, "PDB");
    }

    #[test]
    fn xyz_family_shares_one_descriptor() {
        let xyz = descriptor_for_ext("xyz").unwrap();
        let xmol = descriptor_for_ext("xmol").unwrap();
        let arc = descriptor_for_ext("arc").unwrap();
        assert_eq!(xyz.name, "XYZ");
        assert_eq!(xmol.name, "XYZ");
        assert_eq!(arc.name, "XYZ");
    }

    #[test]
    fn unknown_extension_is_absent() {
        assert!(descriptor_for_ext("docx").is_none());
    }

    #[test]
    fn capability_split_matches_spec_table() {
        assert!(descriptor_for_ext("gro").unwrap().molecule_capable);
        assert!(!descriptor_for_ext("gro").unwrap().trajectory_capable);
        assert!(!descriptor_for_ext("xtc").unwrap().molecule_capable);
        assert!(descriptor_for_ext("xtc").unwrap().trajectory_capable);
        assert!(descriptor_for_ext("pdb").unwrap().molecule_capable);
        assert!(descriptor_for_ext("pdb").unwrap().trajectory_capable);
    }
}
