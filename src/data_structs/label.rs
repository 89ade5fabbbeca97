use std::ops::{
    BitOr,
    BitOrAssign,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Overlap flags of a query location against one node of a gene model.
///
/// Nodes only accumulate flags while a tree is being built; the textual
/// label is derived from them once the node is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapFlags {
    pub in_promoter:   bool,
    pub in_feature:    bool,
    pub is_intragenic: bool,
}

impl OverlapFlags {
    pub const fn new(
        in_promoter: bool,
        in_feature: bool,
        is_intragenic: bool,
    ) -> Self {
        Self {
            in_promoter,
            in_feature,
            is_intragenic,
        }
    }

    pub fn label(&self) -> String {
        make_label(self.in_promoter, self.in_feature, self.is_intragenic)
    }
}

impl BitOr for OverlapFlags {
    type Output = OverlapFlags;

    fn bitor(
        self,
        rhs: Self,
    ) -> Self::Output {
        OverlapFlags {
            in_promoter:   self.in_promoter || rhs.in_promoter,
            in_feature:    self.in_feature || rhs.in_feature,
            is_intragenic: self.is_intragenic || rhs.is_intragenic,
        }
    }
}

impl BitOrAssign for OverlapFlags {
    fn bitor_assign(
        &mut self,
        rhs: Self,
    ) {
        *self = *self | rhs;
    }
}

/// Renders overlap flags as a comma separated label.
///
/// Tokens appear in a fixed order: `promoter`, then `exonic` or `intronic`
/// (never both, `exonic` wins), then `intragenic` or `intergenic`. The
/// result is never empty.
pub fn make_label(
    in_promoter: bool,
    in_feature: bool,
    is_intragenic: bool,
) -> String {
    let mut tokens: Vec<&'static str> = Vec::with_capacity(3);
    if in_promoter {
        tokens.push("promoter");
    }
    if in_feature {
        tokens.push("exonic");
    }
    else if is_intragenic {
        tokens.push("intronic");
    }
    tokens.push(if is_intragenic {
        "intragenic"
    }
    else {
        "intergenic"
    });
    tokens.join(",")
}
