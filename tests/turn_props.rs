use proptest::prelude::*;
use seabattle::{Role, TurnToken, Verdict};

fn verdict() -> impl Strategy<Value = Verdict> {
    prop_oneof![Just(Verdict::Hit), Just(Verdict::Miss)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn exactly_one_side_holds_the_token(verdicts in prop::collection::vec(verdict(), 0..200)) {
        let mut host = TurnToken::new(Role::Host.has_initiative());
        let mut join = TurnToken::new(Role::Join.has_initiative());
        prop_assert!(host.holds());
        for v in verdicts {
            host.apply_verdict(v);
            join.apply_verdict(v);
            prop_assert_ne!(host.holds(), join.holds());
        }
    }

    #[test]
    fn token_moves_iff_miss(verdicts in prop::collection::vec(verdict(), 1..200)) {
        let mut token = TurnToken::new(true);
        for v in verdicts {
            let before = token.holds();
            token.apply_verdict(v);
            prop_assert_eq!(before != token.holds(), v == Verdict::Miss);
        }
    }
}
