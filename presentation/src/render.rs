//! Plain-text views of bills, meetings and votes.

use colored::Colorize;
use domain::models::{page_window, parse_maybe_json_array, Bill, BillPage, Meeting, MeetingPage};
use domain::vote::{VoteChoice, VoteCounts, VoteStatus};
use shared::utils::truncate_chars;

const PAGE_WINDOW: u32 = 5;

pub fn choice_label(choice: VoteChoice) -> &'static str {
    match choice {
        VoteChoice::Agree => "찬성",
        VoteChoice::Disagree => "반대",
    }
}

/// Results stay hidden until this device has voted, as on the bill page.
pub fn tally_line(counts: VoteCounts, reveal: bool) -> String {
    if !reveal {
        return format!("투표 후 결과가 표시됩니다 · 총 {}명 참여", counts.total);
    }
    let (agree, disagree) = counts.percentages();
    format!(
        "{} {:.1}% ({}) · {} {:.1}% ({}) · 총 {}명 참여",
        "찬성".blue(),
        agree,
        counts.agree,
        "반대".red(),
        disagree,
        counts.disagree,
        counts.total
    )
}

pub fn local_marker(status: VoteStatus) -> String {
    match status.choice {
        Some(choice) if status.voted => format!("[{} 완료]", choice_label(choice)),
        _ => String::new(),
    }
}

pub fn bill_row(bill: &Bill, local: VoteStatus) -> String {
    format!(
        "{:>6}  {}  {} {}  {}",
        bill.id.to_string().bold(),
        truncate_chars(&bill.bill_name, 40),
        format!("#{}", bill.tag).dimmed(),
        bill.stage.dimmed(),
        local_marker(local).green()
    )
}

pub fn page_footer(page: &BillPage) -> String {
    if page.total_pages == 0 {
        return "결과가 없습니다".to_string();
    }
    let pages = page_window(page.page, page.total_pages, PAGE_WINDOW)
        .into_iter()
        .map(|p| {
            let label = (p + 1).to_string();
            if p == page.page {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{}{}{}  ({}건)",
        if page.has_previous { "‹ " } else { "" },
        pages,
        if page.has_next { " ›" } else { "" },
        page.total_elements
    )
}

pub fn bill_detail(bill: &Bill) -> String {
    let mut out = Vec::new();
    out.push(format!("{}  {}", format!("#{}", bill.tag).dimmed(), bill.stage.dimmed()));
    out.push(bill.bill_name.bold().to_string());
    out.push(format!(
        "{} · {} · {}",
        bill.propose_date, bill.proposer_kind, bill.proposer
    ));
    if !bill.highlight().is_empty() {
        out.push(format!("핵심: {}", bill.highlight()));
    }
    let sections = [
        ("한 줄 요약", &bill.summary_line),
        ("제안 배경", &bill.summary_background),
        ("주요 내용", &bill.summary_content),
        ("기대 효과", &bill.summary_effect),
    ];
    for (title, body) in sections {
        if body.trim().is_empty() {
            continue;
        }
        out.push(String::new());
        out.push(title.bold().to_string());
        for item in parse_maybe_json_array(body) {
            out.push(format!("  {item}"));
        }
    }
    out.join("\n")
}

pub fn meeting_row(meeting: &Meeting) -> String {
    let mut out = vec![format!(
        "{:>6}  {}  {}",
        meeting.id.to_string().bold(),
        meeting.conf_date.dimmed(),
        meeting.title
    )];
    if !meeting.summary.trim().is_empty() {
        out.push(format!("        {}", truncate_chars(meeting.summary.trim(), 120)));
    }
    for item in &meeting.discussion_items {
        out.push(format!("        - {item}"));
    }
    if !meeting.vod_link_url.is_empty() {
        out.push(format!("        영상: {}", meeting.vod_link_url));
    }
    out.join("\n")
}

pub fn meetings_footer(page: &MeetingPage) -> String {
    match (page.has_next, page.next_cursor) {
        (true, Some(cursor)) => format!("더 보기: --cursor {cursor}"),
        _ => "마지막 페이지입니다".to_string(),
    }
}
