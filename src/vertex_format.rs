use crate::error::RenderError;

const FLOAT_SIZE: usize = std::mem::size_of::<f32>();

/// Per-vertex attribute channel, looked up in the shader by a fixed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexChannel {
    Position,
    Normal,
    Tangent,
    Bitangent,
    Color,
    Uv0,
    Uv1,
    Uv2,
    Uv3,
}

impl VertexChannel {
    pub fn attribute_name(&self) -> &'static str {
        match self {
            VertexChannel::Position => "position",
            VertexChannel::Normal => "normal",
            VertexChannel::Tangent => "tan",
            VertexChannel::Bitangent => "btan",
            VertexChannel::Color => "color",
            VertexChannel::Uv0 => "texcoord0",
            VertexChannel::Uv1 => "texcoord1",
            VertexChannel::Uv2 => "texcoord2",
            VertexChannel::Uv3 => "texcoord3",
        }
    }
}

/// Which channels a vertex buffer interleaves, in order. Every component is a
/// 32-bit float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Pos2,
    Pos3,
    Pos2Uv2,
    Pos3Uv2,
    Pos2Col3Uv2,
    Pos3Nor3Uv2,
    Pos3Nor3Col3Uv2,
    Pos3Nor3Tan3Col3Uv2,
    Pos3Nor3Tan3Btan3Col3Uv2,
    Pos3Nor3Tan3Btan3Col3Uv2Uv2,
    Pos3Nor3Tan3Btan3Col3Uv2Uv2Uv2,
    Pos3Nor3Tan3Btan3Col3Uv2Uv2Uv2Uv2,
}

use VertexChannel::*;

const POS2: &[(VertexChannel, i32)] = &[(Position, 2)];
const POS3: &[(VertexChannel, i32)] = &[(Position, 3)];
const POS2_UV2: &[(VertexChannel, i32)] = &[(Position, 2), (Uv0, 2)];
const POS3_UV2: &[(VertexChannel, i32)] = &[(Position, 3), (Uv0, 2)];
const POS2_COL3_UV2: &[(VertexChannel, i32)] = &[(Position, 2), (Color, 3), (Uv0, 2)];
const POS3_NOR3_UV2: &[(VertexChannel, i32)] = &[(Position, 3), (Normal, 3), (Uv0, 2)];
const POS3_NOR3_COL3_UV2: &[(VertexChannel, i32)] =
    &[(Position, 3), (Normal, 3), (Color, 3), (Uv0, 2)];
const POS3_NOR3_TAN3_COL3_UV2: &[(VertexChannel, i32)] = &[
    (Position, 3),
    (Normal, 3),
    (Tangent, 3),
    (Color, 3),
    (Uv0, 2),
];
const POS3_NOR3_TAN3_BTAN3_COL3_UV2: &[(VertexChannel, i32)] = &[
    (Position, 3),
    (Normal, 3),
    (Tangent, 3),
    (Bitangent, 3),
    (Color, 3),
    (Uv0, 2),
];
const POS3_NOR3_TAN3_BTAN3_COL3_UV2X2: &[(VertexChannel, i32)] = &[
    (Position, 3),
    (Normal, 3),
    (Tangent, 3),
    (Bitangent, 3),
    (Color, 3),
    (Uv0, 2),
    (Uv1, 2),
];
const POS3_NOR3_TAN3_BTAN3_COL3_UV2X3: &[(VertexChannel, i32)] = &[
    (Position, 3),
    (Normal, 3),
    (Tangent, 3),
    (Bitangent, 3),
    (Color, 3),
    (Uv0, 2),
    (Uv1, 2),
    (Uv2, 2),
];
const POS3_NOR3_TAN3_BTAN3_COL3_UV2X4: &[(VertexChannel, i32)] = &[
    (Position, 3),
    (Normal, 3),
    (Tangent, 3),
    (Bitangent, 3),
    (Color, 3),
    (Uv0, 2),
    (Uv1, 2),
    (Uv2, 2),
    (Uv3, 2),
];

impl VertexFormat {
    /// Table order; `VertexFormat::try_from` takes indices into it.
    pub const ALL: [VertexFormat; 12] = [
        VertexFormat::Pos2,
        VertexFormat::Pos3,
        VertexFormat::Pos2Uv2,
        VertexFormat::Pos3Uv2,
        VertexFormat::Pos2Col3Uv2,
        VertexFormat::Pos3Nor3Uv2,
        VertexFormat::Pos3Nor3Col3Uv2,
        VertexFormat::Pos3Nor3Tan3Col3Uv2,
        VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2,
        VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2Uv2,
        VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2Uv2Uv2,
        VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2Uv2Uv2Uv2,
    ];

    /// Channels and their component counts, in buffer order.
    pub fn channels(&self) -> &'static [(VertexChannel, i32)] {
        match self {
            VertexFormat::Pos2 => POS2,
            VertexFormat::Pos3 => POS3,
            VertexFormat::Pos2Uv2 => POS2_UV2,
            VertexFormat::Pos3Uv2 => POS3_UV2,
            VertexFormat::Pos2Col3Uv2 => POS2_COL3_UV2,
            VertexFormat::Pos3Nor3Uv2 => POS3_NOR3_UV2,
            VertexFormat::Pos3Nor3Col3Uv2 => POS3_NOR3_COL3_UV2,
            VertexFormat::Pos3Nor3Tan3Col3Uv2 => POS3_NOR3_TAN3_COL3_UV2,
            VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2 => POS3_NOR3_TAN3_BTAN3_COL3_UV2,
            VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2Uv2 => POS3_NOR3_TAN3_BTAN3_COL3_UV2X2,
            VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2Uv2Uv2 => POS3_NOR3_TAN3_BTAN3_COL3_UV2X3,
            VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2Uv2Uv2Uv2 => POS3_NOR3_TAN3_BTAN3_COL3_UV2X4,
        }
    }

    /// Floats per vertex.
    pub fn floats_per_vertex(&self) -> usize {
        self.channels().iter().map(|(_, size)| *size as usize).sum()
    }

    /// Stride in bytes.
    pub fn stride(&self) -> i32 {
        (self.floats_per_vertex() * FLOAT_SIZE) as i32
    }

    /// One layout per channel with byte offsets from the start of a vertex.
    pub fn layouts(&self) -> Vec<Layout> {
        let mut offset = 0;
        self.channels()
            .iter()
            .map(|&(channel, size)| {
                let layout = Layout {
                    channel,
                    size,
                    offset,
                };
                offset += size as usize * FLOAT_SIZE;
                layout
            })
            .collect()
    }
}

impl TryFrom<u32> for VertexFormat {
    type Error = RenderError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        VertexFormat::ALL
            .get(tag as usize)
            .copied()
            .ok_or(RenderError::UnsupportedVertexFormat(tag))
    }
}

/// Where one channel lives inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub channel: VertexChannel,
    pub size: i32,
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos3_nor3_uv2_matches_the_usual_interleaving() {
        let format = VertexFormat::Pos3Nor3Uv2;
        assert_eq!(format.floats_per_vertex(), 8);
        assert_eq!(format.stride(), 32);

        let layouts = format.layouts();
        let offsets: Vec<_> = layouts.iter().map(|l| (l.channel, l.offset)).collect();
        assert_eq!(
            offsets,
            vec![(Position, 0), (Normal, 12), (Uv0, 24)]
        );
    }

    #[test]
    fn strides_match_the_table() {
        let floats: Vec<_> = VertexFormat::ALL
            .iter()
            .map(|f| f.floats_per_vertex())
            .collect();
        assert_eq!(floats, vec![2, 3, 4, 5, 7, 8, 11, 14, 17, 19, 21, 23]);

        for format in VertexFormat::ALL {
            let last = format.layouts().last().copied().expect("every format has a position");
            let end = last.offset + last.size as usize * FLOAT_SIZE;
            assert_eq!(format.stride(), end as i32);
        }
    }

    #[test]
    fn widest_format_puts_uvs_last() {
        let layouts = VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2Uv2Uv2Uv2.layouts();
        let names: Vec<_> = layouts.iter().map(|l| l.channel.attribute_name()).collect();
        assert_eq!(
            names,
            vec![
                "position",
                "normal",
                "tan",
                "btan",
                "color",
                "texcoord0",
                "texcoord1",
                "texcoord2",
                "texcoord3"
            ]
        );
        assert_eq!(layouts[4].offset, 12 * 4);
        assert_eq!(layouts[8].offset, 21 * 4);
    }

    #[test]
    fn raw_tags_outside_the_table_are_rejected() {
        assert_eq!(VertexFormat::try_from(0), Ok(VertexFormat::Pos2));
        assert_eq!(
            VertexFormat::try_from(11),
            Ok(VertexFormat::Pos3Nor3Tan3Btan3Col3Uv2Uv2Uv2Uv2)
        );
        assert_eq!(
            VertexFormat::try_from(12),
            Err(RenderError::UnsupportedVertexFormat(12))
        );
    }
}
