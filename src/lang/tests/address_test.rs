use super::super::address::{flatten,scan_labels};
use super::super::{LabelAddress,LabelMap};

fn labels(body: &str) -> LabelMap {
    let stream = flatten(body).expect("flatten error");
    scan_labels(&stream).expect("label error")
}

mod flattening {
    use super::*;

    #[test]
    fn hex_concatenates() {
        assert_eq!(flatten(" aa bb cc ").expect("flatten error"),"aabbcc");
    }
    #[test]
    fn placeholder_digit_counts_as_zero() {
        assert_eq!(flatten(" xx xa ").expect("flatten error"),"000a");
    }
    #[test]
    fn x_binding_is_discarded() {
        // the address pass reads x as 0 no matter what @x says
        assert_eq!(flatten(" @x=f xx ").expect("flatten error"),"00");
    }
    #[test]
    fn labels_read_as_zero() {
        assert_eq!(flatten(" @adr.s aa bb [#s+<0002>] ").expect("flatten error")," @adr.s aabb0200");
    }
    #[test]
    fn overwrite_is_discarded() {
        assert_eq!(flatten(" aa @overwrite(<0002>, ee) bb ").expect("flatten error"),"aabb");
    }
    #[test]
    fn directives_pass_through() {
        let stream = flatten(" @offset=1000 aa @rstoffst @adr.x ").expect("flatten error");
        assert_eq!(stream," @offset=1000 aa @rstoffst  @adr.x ");
    }
    #[test]
    fn comments_are_ignored() {
        assert_eq!(flatten(" aa // bb\n cc ; dd\n").expect("flatten error"),"aacc");
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn subtraction_wraps_at_operand_width() {
        assert_eq!(flatten(" <0001-0002> ").expect("flatten error"),"FFFF");
    }
    #[test]
    fn addition_carries_past_the_width() {
        assert_eq!(flatten(" <ffff+0001> ").expect("flatten error"),"10000");
    }
    #[test]
    fn width_follows_widest_operand() {
        assert_eq!(flatten(" <01+02> ").expect("flatten error"),"03");
        assert_eq!(flatten(" <000001+02> ").expect("flatten error"),"000003");
    }
    #[test]
    fn juxtaposition_concatenates() {
        assert_eq!(flatten(" <aa bb> ").expect("flatten error"),"aabb");
        assert_eq!(flatten(" aa [bb cc] ").expect("flatten error"),"aaccbb");
    }
    #[test]
    fn endian_swap_needs_whole_pairs() {
        assert!(flatten(" [aa] ").is_err());
        assert!(flatten(" [aa bb cc] ").is_err());
    }
    #[test]
    fn endian_swap_is_an_involution() {
        assert_eq!(flatten(" [[aa bb cc dd]] ").expect("flatten error"),"aabbccdd");
    }
}

mod label_map {
    use super::*;

    #[test]
    fn offset_sets_the_base() {
        let map = labels(" @offset=1000 aa bb @adr.mid cc ");
        assert_eq!(map.get("mid"),Some(&LabelAddress { absolute: 0x1002, relative: 0x0002 }));
    }
    #[test]
    fn rstoffst_resets_the_count_but_not_the_base() {
        let map = labels(" @offset=1000 aa bb @rstoffst @adr.l ");
        assert_eq!(map.get("l"),Some(&LabelAddress { absolute: 0x1000, relative: 0x0000 }));
    }
    #[test]
    fn later_offset_moves_later_labels() {
        let map = labels(" @adr.a aa @offset=2000 @adr.b ");
        assert_eq!(map.get("a"),Some(&LabelAddress { absolute: 0x0000, relative: 0x0000 }));
        assert_eq!(map.get("b"),Some(&LabelAddress { absolute: 0x2001, relative: 0x0001 }));
    }
    #[test]
    fn evaluated_bytes_are_counted() {
        let map = labels(" [#z+<0002>] aa @adr.z ");
        assert_eq!(map.get("z"),Some(&LabelAddress { absolute: 0x0003, relative: 0x0003 }));
    }
    #[test]
    fn absolute_wraps_at_16_bits() {
        let map = labels(" @offset=ffff aa @adr.w ");
        assert_eq!(map.get("w"),Some(&LabelAddress { absolute: 0x0000, relative: 0x0001 }));
    }
    #[test]
    fn duplicate_label_is_an_error() {
        let stream = flatten(" @adr.x aa @adr.x ").expect("flatten error");
        let err = scan_labels(&stream).expect_err("expected failure");
        assert!(err.to_string().contains("already defined"));
    }
}
