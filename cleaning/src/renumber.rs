use common::MatchRecord;

/// Numbers the remaining rounds 1..=N in order.
pub fn renumber_rounds(record: &mut MatchRecord) {
    for (i, round) in record.game_rounds.iter_mut().enumerate() {
        round.round_num = i as i64 + 1;
    }
}

/// Gives every remaining frame a match wide id, starting at 0.
pub fn renumber_frames(record: &mut MatchRecord) {
    let frames = record
        .game_rounds
        .iter_mut()
        .flat_map(|round| round.frames.iter_mut());

    for (i, frame) in frames.enumerate() {
        frame.global_frame_id = i as i64;
    }
}

pub fn renumber(record: &mut MatchRecord) {
    renumber_rounds(record);
    renumber_frames(record);
}
