/// 单眼检测与缓存眼睛匹配的最大水平距离（像素）
pub const DEFAULT_EYE_MATCH_THRESHOLD_PX: f64 = 20.0;

/// 单眼模式下状态持续多久才触发按下/释放（毫秒）
pub const DEFAULT_EYE_DWELL_MS: u64 = 100;

/// 闭合度比值超过此值视为闭眼
pub const DEFAULT_CLOSED_RATIO_THRESHOLD: f64 = 5.7;

/// 短眨眼最短闭眼时长（毫秒）
pub const DEFAULT_SHORT_BLINK_MS: u64 = 100;

/// 长闭眼触发右键的时长（毫秒）
pub const DEFAULT_LONG_HOLD_MS: u64 = 1000;

/// 眨眼事件窗口基础时长（毫秒）
pub const DEFAULT_BLINK_WINDOW_MS: u64 = 1000;

/// 每次眨眼延长窗口的比例（相对于基础时长）
pub const DEFAULT_WINDOW_EXTENSION: f64 = 0.667;

/// 运动传感器死区（传感器单位 x1000）
pub const DEFAULT_SENSOR_DEAD_ZONE: u32 = 45;

/// 运动传感器灵敏度，范围 1..=1000
pub const DEFAULT_SENSOR_SENSITIVITY: u32 = 7;

/// 传感器连接最大尝试次数
pub const DEFAULT_SENSOR_CONNECT_ATTEMPTS: u32 = 5;

/// 传感器连接重试间隔（毫秒）
pub const DEFAULT_SENSOR_RETRY_BACKOFF_MS: u64 = 500;

/// 采集线程等待下一帧时检查停止标志的间隔（毫秒）
pub const CAPTURE_STOP_POLL_MS: u64 = 20;

/// 回放文件默认路径
pub const DEFAULT_REPLAY_PATH: &str = "./recordings/session.jsonl";

/// 默认日志目录
pub const DEFAULT_LOG_DIR: &str = "./logs";
