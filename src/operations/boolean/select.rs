/// The boolean set operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
}

/// Which input surface a piece comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    First,
    Second,
}

/// Where a piece of one operand lies with respect to the other operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Outside,
}

/// Decision about whether to keep a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepDecision {
    Keep,
    KeepFlipped,
    Discard,
}

/// Decides the fate of a piece from its operand and its location relative
/// to the other operand.
///
/// | Piece of | Location | Union   | Intersection | Difference |
/// |----------|----------|---------|--------------|------------|
/// | first    | outside  | keep    | discard      | keep       |
/// | first    | inside   | discard | keep         | discard    |
/// | second   | outside  | keep    | discard      | discard    |
/// | second   | inside   | discard | keep         | flip       |
#[allow(clippy::match_same_arms)]
#[must_use]
pub fn should_keep_piece(source: Operand, location: Location, op: BooleanOp) -> KeepDecision {
    match (source, location, op) {
        (_, Location::Outside, BooleanOp::Union) => KeepDecision::Keep,
        (_, Location::Inside, BooleanOp::Union) => KeepDecision::Discard,

        (_, Location::Inside, BooleanOp::Intersection) => KeepDecision::Keep,
        (_, Location::Outside, BooleanOp::Intersection) => KeepDecision::Discard,

        (Operand::First, Location::Outside, BooleanOp::Difference) => KeepDecision::Keep,
        (Operand::First, Location::Inside, BooleanOp::Difference) => KeepDecision::Discard,
        (Operand::Second, Location::Outside, BooleanOp::Difference) => KeepDecision::Discard,
        (Operand::Second, Location::Inside, BooleanOp::Difference) => KeepDecision::KeepFlipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_keeps_outside_pieces() {
        for source in [Operand::First, Operand::Second] {
            assert_eq!(
                should_keep_piece(source, Location::Outside, BooleanOp::Union),
                KeepDecision::Keep
            );
            assert_eq!(
                should_keep_piece(source, Location::Inside, BooleanOp::Union),
                KeepDecision::Discard
            );
        }
    }

    #[test]
    fn intersection_keeps_inside_pieces() {
        for source in [Operand::First, Operand::Second] {
            assert_eq!(
                should_keep_piece(source, Location::Inside, BooleanOp::Intersection),
                KeepDecision::Keep
            );
        }
    }

    #[test]
    fn difference_flips_second_inside() {
        assert_eq!(
            should_keep_piece(Operand::Second, Location::Inside, BooleanOp::Difference),
            KeepDecision::KeepFlipped
        );
        assert_eq!(
            should_keep_piece(Operand::Second, Location::Outside, BooleanOp::Difference),
            KeepDecision::Discard
        );
        assert_eq!(
            should_keep_piece(Operand::First, Location::Outside, BooleanOp::Difference),
            KeepDecision::Keep
        );
    }
}
