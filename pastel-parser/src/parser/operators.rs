use nom::branch::{alt, Alt};
use nom::bytes::complete::tag;
use nom::combinator::{map, opt, value};
use nom::error::Error;
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded, terminated, tuple};
use nom::{IResult, Parser};
use pastel_core::formula::{Formula, TimeBound};

use super::common::{keyword, name, number, op0};

fn unaryop<'a, O, S, T, F, U>(ops: O, mut subparser: S, func: F) -> impl FnMut(&'a str) -> IResult<&'a str, U>
where
    O: Alt<&'a str, &'a str, Error<&'a str>>,
    S: Parser<&'a str, T, Error<&'a str>>,
    F: Fn(T) -> U,
{
    let mut op = alt(ops);

    move |input: &'a str| {
        let (next, _) = op.parse(input)?;
        let (rest, subformula) = subparser.parse(next)?;

        Ok((rest, func(subformula)))
    }
}

/// Time bound `[a:b]`. The forms `[a:]` and `[a:inf]` leave the window unbounded above and a
/// missing lower bound is zero.
pub fn bound(input: &str) -> IResult<&str, TimeBound> {
    let upper = alt((value(None, tag("inf")), map(number, Some)));
    let mut parser = tuple((op0("["), opt(number), op0(":"), opt(upper), op0("]")));
    let (rest, (_, lower, _, upper, _)) = parser(input)?;
    let lower = lower.unwrap_or(0.0);

    let bound = match upper.flatten() {
        Some(upper) => TimeBound::new(lower, upper),
        None => TimeBound::at_least(lower),
    };

    Ok((rest, bound))
}

fn boundedop<'a, O, S, T, F, U>(ops: O, mut subparser: S, func: F) -> impl FnMut(&'a str) -> IResult<&'a str, U>
where
    O: Alt<&'a str, &'a str, Error<&'a str>>,
    S: Parser<&'a str, T, Error<&'a str>>,
    F: Fn(T, Option<TimeBound>) -> U,
{
    let mut bounds = preceded(alt(ops), opt(bound));

    move |input: &'a str| {
        let (next, bound) = bounds.parse(input)?;
        let (rest, formula) = subparser.parse(next)?;

        Ok((rest, func(formula, bound)))
    }
}

/// Left-associative chain `operand (op operand)*`.
fn chain<'a, O, B, P, F>(mut op: O, mut operand: P, func: F) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    O: Parser<&'a str, B, Error<&'a str>>,
    P: Parser<&'a str, Formula, Error<&'a str>>,
    F: Fn(Formula, B, Formula) -> Formula,
{
    move |input: &'a str| {
        let (mut rest, mut left) = operand.parse(input)?;

        loop {
            match op.parse(rest) {
                Ok((next, operator)) => {
                    let (next, right) = operand.parse(next)?;

                    left = func(left, operator, right);
                    rest = next;
                }
                Err(nom::Err::Error(_)) => return Ok((rest, left)),
                Err(err) => return Err(err),
            }
        }
    }
}

pub fn not<'a, S>(subparser: S) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    S: Parser<&'a str, Formula, Error<&'a str>>,
{
    unaryop((op0("!"), keyword("not")), subparser, Formula::not)
}

pub fn previous<'a, S>(subparser: S) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    S: Parser<&'a str, Formula, Error<&'a str>>,
{
    unaryop((keyword("pre"), keyword("Y")), subparser, Formula::previous)
}

pub fn once<'a, S>(subparser: S) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    S: Parser<&'a str, Formula, Error<&'a str>>,
{
    let ctor = |subformula: Formula, bound| match bound {
        Some(bound) => subformula.once_within(bound),
        None => subformula.once(),
    };

    boundedop((keyword("once"), keyword("P")), subparser, ctor)
}

pub fn historically<'a, S>(subparser: S) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    S: Parser<&'a str, Formula, Error<&'a str>>,
{
    let ctor = |subformula: Formula, bound| match bound {
        Some(bound) => subformula.historically_within(bound),
        None => subformula.historically(),
    };

    boundedop((keyword("historically"), keyword("H")), subparser, ctor)
}

pub fn since<'a, P>(operand: P) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    P: Parser<&'a str, Formula, Error<&'a str>>,
{
    let op = preceded(alt((keyword("since"), keyword("S"))), opt(bound));
    let ctor = |left: Formula, bound, right| match bound {
        Some(bound) => left.since_within(bound, right),
        None => left.since(right),
    };

    chain(op, operand, ctor)
}

pub fn and<'a, P>(operand: P) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    P: Parser<&'a str, Formula, Error<&'a str>>,
{
    let op = value((), alt((op0("&&"), keyword("and"))));
    chain(op, operand, |left: Formula, _, right| left.and(right))
}

pub fn or<'a, P>(operand: P) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    P: Parser<&'a str, Formula, Error<&'a str>>,
{
    let op = value((), alt((op0("||"), keyword("or"))));
    chain(op, operand, |left: Formula, _, right| left.or(right))
}

/// Right-associative implication, `a -> b -> c` reads as `a -> (b -> c)`.
pub fn implies<'a, P1, P2>(mut left_parser: P1, right_parser: P2) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    P1: Parser<&'a str, Formula, Error<&'a str>>,
    P2: Parser<&'a str, Formula, Error<&'a str>>,
{
    let mut right_parser = opt(preceded(alt((op0("->"), keyword("implies"))), right_parser));

    move |input: &'a str| {
        let (next, left) = left_parser.parse(input)?;
        let (rest, right) = right_parser.parse(next)?;

        let formula = match right {
            Some(right) => left.implies(right),
            None => left,
        };

        Ok((rest, formula))
    }
}

fn variables(input: &str) -> IResult<&str, Vec<String>> {
    let names = separated_list1(op0(","), name);
    let mut parser = terminated(delimited(op0("["), names, op0("]")), op0("."));

    parser(input)
}

pub fn exists<'a, S>(subparser: S) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    S: Parser<&'a str, Formula, Error<&'a str>>,
{
    let body = tuple((variables, subparser));
    unaryop((keyword("exists"), keyword("E")), body, |(vars, body)| Formula::exists(vars, body))
}

pub fn forall<'a, S>(subparser: S) -> impl FnMut(&'a str) -> IResult<&'a str, Formula>
where
    S: Parser<&'a str, Formula, Error<&'a str>>,
{
    let body = tuple((variables, subparser));
    unaryop((keyword("forall"), keyword("A")), body, |(vars, body)| Formula::forall(vars, body))
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use pastel_core::formula::{Formula, TimeBound};

    use super::{and, bound, implies, not, once, since};
    use crate::parser::atoms::record;

    #[test]
    fn parse_bounds() -> Result<(), Box<dyn Error>> {
        assert_eq!(bound("[12:24] {p}")?, ("{p}", TimeBound::new(12.0, 24.0)));
        assert_eq!(bound("[ 2 : ]")?, ("", TimeBound::at_least(2.0)));
        assert_eq!(bound("[2:inf]")?, ("", TimeBound::at_least(2.0)));
        assert_eq!(bound("[:5]")?, ("", TimeBound::at_most(5.0)));
        assert!(bound("[a, b]").is_err());

        Ok(())
    }

    #[test]
    fn parse_unary() -> Result<(), Box<dyn Error>> {
        let (_, formula) = not(record)("! {p}")?;
        assert_eq!(formula, Formula::prop("p").not());

        let (_, formula) = once(record)("once[0:3] {p}")?;
        assert_eq!(formula, Formula::prop("p").once_within(TimeBound::new(0.0, 3.0)));

        let (_, formula) = once(record)("P {p}")?;
        assert_eq!(formula, Formula::prop("p").once());

        assert!(once(record)("onward {p}").is_err());

        Ok(())
    }

    #[test]
    fn parse_chains() -> Result<(), Box<dyn Error>> {
        let (_, formula) = and(record)("{a} && {b} and {c}")?;
        let expected = Formula::prop("a").and(Formula::prop("b")).and(Formula::prop("c"));
        assert_eq!(formula, expected);

        let (rest, formula) = since(record)("{p} S[1:2] {q} || {r}")?;
        let expected = Formula::prop("p").since_within(TimeBound::new(1.0, 2.0), Formula::prop("q"));
        assert_eq!(formula, expected);
        assert_eq!(rest, "|| {r}");

        Ok(())
    }

    #[test]
    fn parse_implication() -> Result<(), Box<dyn Error>> {
        fn chain(input: &str) -> nom::IResult<&str, Formula> {
            implies(record, chain)(input)
        }

        let (_, formula) = chain("{a} -> {b} implies {c}")?;
        let expected = Formula::prop("a").implies(Formula::prop("b").implies(Formula::prop("c")));
        assert_eq!(formula, expected);

        Ok(())
    }
}
