use super::*;

#[tokio::test]
async fn simulated_playback_emits_frames_until_duration() {
    let mut video = SimulatedPlayback::new(Fps::new(10, 1).unwrap(), 0.3);
    assert!(video.next_frame().await.is_none(), "paused by default");

    video.play();
    let mut times = Vec::new();
    while let Some(meta) = video.next_frame().await {
        times.push(meta.media_time);
    }
    assert_eq!(times.len(), 3);
    assert_eq!(times[0], 0.0);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    assert!(video.is_ended());
}

#[tokio::test]
async fn simulated_playback_honours_pause_and_seek() {
    let mut video = SimulatedPlayback::new(Fps::new(30, 1).unwrap(), 2.0);
    video.play();
    video.seek(1.0);
    let meta = video.next_frame().await.unwrap();
    assert!((meta.media_time - 1.0).abs() < 1e-9);

    video.pause();
    assert!(video.next_frame().await.is_none());
    video.play();
    assert!(video.next_frame().await.is_some());
}

#[tokio::test]
async fn scripted_playback_replays_times_in_order() {
    let mut video = ScriptedPlayback::new([0.0, 0.5, 0.25]);
    let mut seen = Vec::new();
    while let Some(meta) = video.next_frame().await {
        seen.push(meta.media_time);
        assert_eq!(video.current_time(), meta.media_time);
    }
    assert_eq!(seen, vec![0.0, 0.5, 0.25]);
    assert_eq!(video.remaining(), 0);
}
