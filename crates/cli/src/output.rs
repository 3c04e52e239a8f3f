//! Renders a lookup result in dig's presentation style: header line,
//! OPT pseudosection, then question/answer/authority/additional sections.

use ferrous_dig_infrastructure::dns::LookupResult;

pub fn print_result(result: &LookupResult) {
    let header = result.header();
    let flags = header.flags;

    println!(
        ";; ->>HEADER<<- opcode: {}, status: {}, id: {}",
        flags.opcode, flags.rcode, header.id
    );

    let mut flag_names: Vec<&str> = Vec::new();
    if flags.qr {
        flag_names.push("qr");
    }
    if flags.aa {
        flag_names.push("aa");
    }
    if flags.tc {
        flag_names.push("tc");
    }
    if flags.rd {
        flag_names.push("rd");
    }
    if flags.ra {
        flag_names.push("ra");
    }
    println!(
        ";; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
        flag_names.join(" "),
        header.question_count,
        header.answer_count,
        header.authority_count,
        header.additional_count
    );
    println!();

    if let Some(opt) = result.opt() {
        println!(";; OPT PSEUDOSECTION:");
        println!("{}", opt.rdata);
        println!();
    }

    println!(";; QUESTION SECTION:");
    for question in result.questions() {
        println!("{}", question);
    }
    println!();

    if !result.answers().is_empty() {
        println!(";; ANSWER SECTION:");
        for record in result.answers() {
            println!("{}", record);
        }
        println!();
    }

    if !result.authorities().is_empty() {
        println!(";; AUTHORITY SECTION:");
        for record in result.authorities() {
            println!("{}", record);
        }
        println!();
    }

    // The OPT pseudo-record already got its own section above.
    let additionals: Vec<_> = result
        .additionals()
        .iter()
        .filter(|rr| !rr.is_opt())
        .collect();
    if !additionals.is_empty() {
        println!(";; ADDITIONAL SECTION:");
        for record in additionals {
            println!("{}", record);
        }
        println!();
    }

    if let Some(audit) = &result.audit {
        if !audit.is_empty() {
            println!(";; AUDIT TRAIL SECTION:");
            print!("{}", audit);
            println!();
        }
    }

    println!(";; Query time: {} msec", result.elapsed.as_millis());
    println!(";; SERVER: {} ({})", result.server, result.protocol);
}
